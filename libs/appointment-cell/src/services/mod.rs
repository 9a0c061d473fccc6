pub mod access;
pub mod booking;
pub mod lifecycle;
pub mod queries;

pub use booking::AppointmentBookingService;
pub use lifecycle::AppointmentLifecycleService;
pub use queries::AppointmentQueryService;
