pub mod booking;
pub mod lifecycle;

pub use booking::AppointmentBookingService;
pub use lifecycle::AppointmentLifecycleService;

/// Embeds patient and doctor summaries into appointment rows.
pub(crate) const POPULATED_SELECT: &str = "*,patient:users!patient_id(id,name,email,phone),\
doctor:users!doctor_id(id,name,email,specialization,department)";
