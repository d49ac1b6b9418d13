pub mod authority;
pub mod credentials;
pub mod password;
pub mod token;

pub use authority::require_authority;
pub use credentials::Credentials;
pub use token::{Claims, TokenService};
