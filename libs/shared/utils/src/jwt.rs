use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;
use uuid::Uuid;

use shared_models::auth::{JwtClaims, Role, TokenRejection, User, ValidationOutcome};

type HmacSha256 = Hmac<Sha256>;

/// Checks signature, expiry and role claim, in that order.
pub fn validate_token(token: &str, jwt_secret: &str, required_role: Role, now: DateTime<Utc>) -> ValidationOutcome {
    validate_token_for_roles(token, jwt_secret, &[required_role], now)
}

/// Same as [`validate_token`] but accepts any of `allowed_roles`.
pub fn validate_token_for_roles(
    token: &str,
    jwt_secret: &str,
    allowed_roles: &[Role],
    now: DateTime<Utc>,
) -> ValidationOutcome {
    let claims = match decode_claims(token, jwt_secret) {
        Ok(claims) => claims,
        Err(reason) => return ValidationOutcome::Invalid(reason),
    };

    // An unusable subject or expiry makes the token malformed before expiry is judged.
    let Ok(subject) = Uuid::parse_str(&claims.sub) else {
        debug!("Subject '{}' is not a UUID", claims.sub);
        return ValidationOutcome::Invalid(TokenRejection::Malformed);
    };

    let Some(expires_at) = Utc.timestamp_opt(claims.exp, 0).single() else {
        debug!("Expiry {} out of range", claims.exp);
        return ValidationOutcome::Invalid(TokenRejection::Malformed);
    };

    if now >= expires_at {
        debug!("Token expired at {} (now: {})", expires_at, now);
        return ValidationOutcome::Invalid(TokenRejection::Expired);
    }

    let Some(role) = allowed_roles.iter().copied().find(|role| role.as_str() == claims.role) else {
        debug!("Role claim '{}' does not satisfy {:?}", claims.role, allowed_roles);
        return ValidationOutcome::Invalid(TokenRejection::Forbidden);
    };

    let user = User {
        id: subject,
        role,
        email: claims.email,
        expires_at,
    };

    debug!("Token validated successfully for user: {}", user.id);
    ValidationOutcome::Valid(user)
}

/// Verifies the HMAC-SHA256 signature and parses the claims segment.
pub fn decode_claims(token: &str, jwt_secret: &str) -> Result<JwtClaims, TokenRejection> {
    if jwt_secret.is_empty() {
        debug!("JWT secret is not set");
        return Err(TokenRejection::Malformed);
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        debug!("Token has {} segments", parts.len());
        return Err(TokenRejection::Malformed);
    }

    let header_b64 = parts[0];
    let claims_b64 = parts[1];
    let signature_b64 = parts[2];

    let signature = URL_SAFE_NO_PAD.decode(signature_b64).map_err(|e| {
        debug!("Failed to decode signature: {}", e);
        TokenRejection::Malformed
    })?;

    let mut mac = HmacSha256::new_from_slice(jwt_secret.as_bytes()).map_err(|_| TokenRejection::Malformed)?;
    mac.update(format!("{}.{}", header_b64, claims_b64).as_bytes());

    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err(TokenRejection::Malformed);
    }

    let claims_json = URL_SAFE_NO_PAD
        .decode(claims_b64)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(|| {
            debug!("Invalid claims encoding");
            TokenRejection::Malformed
        })?;

    serde_json::from_str::<JwtClaims>(&claims_json).map_err(|e| {
        debug!("Failed to parse claims: {}", e);
        TokenRejection::Malformed
    })
}

/// Produces a token in the format accepted by [`validate_token`].
pub fn sign_claims(claims: &JwtClaims, jwt_secret: &str) -> Result<String, String> {
    let header = serde_json::json!({ "alg": "HS256", "typ": "JWT" });
    let payload = serde_json::to_string(claims).map_err(|e| e.to_string())?;

    let header_encoded = URL_SAFE_NO_PAD.encode(header.to_string());
    let payload_encoded = URL_SAFE_NO_PAD.encode(payload);
    let signing_input = format!("{}.{}", header_encoded, payload_encoded);

    let mut mac = HmacSha256::new_from_slice(jwt_secret.as_bytes()).map_err(|e| e.to_string())?;
    mac.update(signing_input.as_bytes());
    let signature_encoded = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", signing_input, signature_encoded))
}
