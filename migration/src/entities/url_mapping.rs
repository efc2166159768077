use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "url_mappings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub short_url: String,
    #[sea_orm(column_type = "Text")]
    pub original_url: String,
    pub session_id: String,
    pub user_email: Option<String>,
    pub visits: i64,
    pub created_at: DateTimeUtc,
    pub expiry_date: Option<DateTimeUtc>,
    pub is_logged_in: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
