pub mod auth;
pub mod guards;
pub mod response;

pub use auth::{authenticate_jwt, AuthUser};
pub use guards::{ensure_admin, ensure_correct_user_or_admin, ensure_logged_in, Access};
pub use response::{ApiResponse, ApiResult};
