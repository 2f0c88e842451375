pub mod accounts;
pub mod auth;
pub mod password;

pub use accounts::{AccountStore, NewAccount};
pub use auth::AuthService;
