pub mod auth;
pub mod response;
pub mod validate;

pub use auth::{require_admin, require_auth, AuthUser};
pub use response::{ApiResponse, ApiResult};
pub use validate::ValidatedJson;
