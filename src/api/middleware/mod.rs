pub mod request_id;
pub mod session;

pub use request_id::{RequestId, RequestIdMiddleware};
pub use session::{SessionId, SessionMiddleware, anonymous_cookie, expired_cookie, login_cookie};
