pub mod common;

pub mod a101_user_type;
pub mod a102_user;
