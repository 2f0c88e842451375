pub mod extractor;
pub mod jwt;
pub mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use state::AppState;
