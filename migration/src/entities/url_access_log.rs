//! Access log entity, one row per recorded redirect or preview

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "url_access_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub short_url: String,
    pub session_id: Option<String>,
    pub ip_address: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub referrer: Option<String>,
    pub accessed_at: DateTimeUtc,
    /// 'redirect' or 'preview'
    pub visit_type: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub browser: Option<String>,
    pub device: Option<String>,
    pub operating_system: Option<String>,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
