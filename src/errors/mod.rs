pub mod types;

pub use types::{AppError, FetchError};
