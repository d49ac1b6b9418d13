pub mod api;
pub mod authority;
pub mod error;
pub mod pagination;

pub use error::{AuthError, Error, Result};
