pub mod approval;
pub mod stats;

pub use approval::DoctorApprovalService;
pub use stats::StatsService;
