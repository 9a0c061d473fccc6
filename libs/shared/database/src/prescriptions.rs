use std::sync::{PoisonError, RwLock};

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use shared_models::entities::Prescription;

/// Document-style storage for prescriptions. Records are keyed by a string id and
/// only loosely reference their appointment.
#[async_trait]
pub trait PrescriptionStore: Send + Sync {
    /// Persists the prescription, assigning an id when it has none.
    async fn save(&self, prescription: Prescription) -> Result<Prescription>;
    async fn find_by_appointment_id(&self, appointment_id: Uuid) -> Result<Vec<Prescription>>;
}

#[derive(Default)]
pub struct InMemoryPrescriptionStore {
    documents: RwLock<Vec<Prescription>>,
}

impl InMemoryPrescriptionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PrescriptionStore for InMemoryPrescriptionStore {
    async fn save(&self, mut prescription: Prescription) -> Result<Prescription> {
        if prescription.id.is_empty() {
            prescription.id = Uuid::new_v4().simple().to_string();
        }

        let mut documents = self.documents.write().unwrap_or_else(PoisonError::into_inner);
        documents.retain(|p| p.id != prescription.id);
        documents.push(prescription.clone());
        Ok(prescription)
    }

    async fn find_by_appointment_id(&self, appointment_id: Uuid) -> Result<Vec<Prescription>> {
        Ok(self
            .documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|p| p.appointment_id == appointment_id)
            .cloned()
            .collect())
    }
}
