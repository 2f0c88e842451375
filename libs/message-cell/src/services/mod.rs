pub mod messaging;

pub use messaging::{build_conversations, MessageService};
