//! Per-link aggregate counters

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "link_analytics")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub short_url: String,
    pub total_visits: i64,
    pub unique_visitors: i64,
    pub redirect_count: i64,
    pub preview_count: i64,
    /// JSON object, e.g. {"US":10,"IN":5}
    #[sea_orm(column_type = "Text", nullable)]
    pub country_counts: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub browser_counts: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub device_counts: Option<String>,
    pub last_updated: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
