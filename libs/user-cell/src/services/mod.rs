pub mod directory;
pub mod records;
pub mod uploads;

pub use directory::UserDirectoryService;
pub use records::RecordService;
