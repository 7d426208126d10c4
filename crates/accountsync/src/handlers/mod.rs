pub mod accounts;
pub mod error;
pub mod health;

pub use error::AppError;
