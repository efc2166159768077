pub mod link_analytics;
pub mod pending_registration;
pub mod session;
pub mod url_access_log;
pub mod url_mapping;
pub mod user;

pub use link_analytics::Entity as LinkAnalyticsEntity;
pub use pending_registration::Entity as PendingRegistrationEntity;
pub use session::Entity as SessionEntity;
pub use url_access_log::Entity as UrlAccessLogEntity;
pub use url_mapping::Entity as UrlMappingEntity;
pub use user::Entity as UserEntity;
