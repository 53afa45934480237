pub mod claims;
pub mod config;
pub mod error;
pub mod extractors;
pub mod issuer;
pub mod validator;

pub use claims::{is_registered_claim, Claim, Identity, REGISTERED_CLAIMS};
pub use config::{JwtConfig, JwtOptions};
pub use error::{AuthError, AuthResult, ConfigError, IssueError, Rejection};
pub use extractors::AuthContext;
pub use issuer::{TokenDescriptor, TokenIssuer};
pub use validator::TokenValidator;
