pub mod memory;
pub mod prescriptions;
pub mod store;
pub mod supabase;

pub use memory::InMemoryClinicStore;
pub use prescriptions::{InMemoryPrescriptionStore, PrescriptionStore};
pub use store::{ClinicStore, StoreError, StoreResult};
pub use supabase::{SupabaseClient, SupabasePrescriptionStore};
