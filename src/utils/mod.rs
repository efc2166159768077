pub mod ip;
pub mod password;
pub mod url_validator;

pub use ip::{extract_client_ip, reserved_scope};
pub use password::{hash_password, verify_password};
pub use url_validator::{UrlValidationError, normalize_url, points_to_service, with_default_scheme};
