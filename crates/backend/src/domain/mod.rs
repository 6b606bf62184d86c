pub mod error;

pub mod a101_user_type;
pub mod a102_user;

pub use error::ServiceError;
