use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use uuid::Uuid;

use shared_config::{AppConfig, DEFAULT_BIND_ADDRESS};
use shared_models::auth::{JwtClaims, Role, User};
use shared_models::entities::{Doctor, Patient, WorkingHours};

use crate::clock::FixedClock;
use crate::jwt::sign_claims;
use crate::state::AppState;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            jwt_secret: self.jwt_secret.clone(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            admin_username: None,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }

    /// In-memory state whose clock starts at `now`.
    pub fn state_at(&self, now: DateTime<Utc>) -> (AppState, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(now));
        let state = AppState::with_clock(self.to_app_config(), clock.clone());
        (state, clock)
    }
}

#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl TestUser {
    pub fn new(email: &str, role: Role) -> Self {
        Self::with_id(Uuid::new_v4(), email, role)
    }

    pub fn with_id(id: Uuid, email: &str, role: Role) -> Self {
        Self {
            id,
            email: email.to_string(),
            role,
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, Role::Doctor)
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, Role::Patient)
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, Role::Admin)
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            role: self.role,
            email: Some(self.email.clone()),
            expires_at: Utc::now() + Duration::hours(24),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        Self::create_token_at(user, secret, Utc::now(), Duration::hours(exp_hours.unwrap_or(24)))
    }

    pub fn create_token_at(user: &TestUser, secret: &str, issued_at: DateTime<Utc>, ttl: Duration) -> String {
        let claims = JwtClaims {
            sub: user.id.to_string(),
            role: user.role.as_str().to_string(),
            exp: (issued_at + ttl).timestamp(),
            email: Some(user.email.clone()),
            iat: Some(issued_at.timestamp()),
        };

        sign_claims(&claims, secret).expect("HMAC can take key of any size")
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

pub fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid wall-clock time")
}

pub struct TestFixtures;

impl TestFixtures {
    /// Doctor working `start..end` on the given weekday (0 = Sunday).
    pub fn doctor(name: &str, specialty: &str, day_of_week: i32, start: NaiveTime, end: NaiveTime) -> Doctor {
        let now = Utc::now();
        let slug = name.to_lowercase().replace([' ', '.'], "");
        Doctor {
            id: Uuid::new_v4(),
            name: name.to_string(),
            specialty: specialty.to_string(),
            email: format!("{}@clinic.test", slug),
            phone: "5550001111".to_string(),
            working_hours: vec![WorkingHours {
                day_of_week,
                start_time: start,
                end_time: end,
            }],
            created_at: now,
            updated_at: now,
        }
    }

    /// Monday 09:00-12:00.
    pub fn monday_morning_doctor(name: &str) -> Doctor {
        Self::doctor(name, "Cardiology", 1, hm(9, 0), hm(12, 0))
    }

    pub fn patient(name: &str, email: &str) -> Patient {
        let now = Utc::now();
        Patient {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            credential: "secret1".to_string(),
            phone: "5551234567".to_string(),
            address: "1 Main Street".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}
