pub mod aggregate;

pub use aggregate::{UserType, UserTypeDto, UserTypeId};
