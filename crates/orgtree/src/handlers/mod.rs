pub mod error;
pub mod groups;
pub mod health;
pub mod persons;

pub use error::AppError;
