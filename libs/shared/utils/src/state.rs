use std::sync::Arc;

use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{ClinicStore, InMemoryClinicStore, InMemoryPrescriptionStore, PrescriptionStore};

use crate::clock::{Clock, SystemClock};
use crate::gateway::AccessGateway;
use crate::locks::KeyedLocks;

/// Shared handles every cell router is built from.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ClinicStore>,
    pub prescriptions: Arc<dyn PrescriptionStore>,
    pub clock: Arc<dyn Clock>,
    /// Serializes availability checks and writes per doctor.
    pub doctor_locks: Arc<KeyedLocks<Uuid>>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<dyn ClinicStore>,
        prescriptions: Arc<dyn PrescriptionStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            store,
            prescriptions,
            clock,
            doctor_locks: Arc::new(KeyedLocks::new()),
        }
    }

    /// Everything in memory, running on the system clock.
    pub fn in_memory(config: AppConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: AppConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            Arc::new(config),
            Arc::new(InMemoryClinicStore::new()),
            Arc::new(InMemoryPrescriptionStore::new()),
            clock,
        )
    }

    pub fn gateway(&self) -> AccessGateway {
        AccessGateway::new(&self.config.jwt_secret, Arc::clone(&self.clock))
    }
}
