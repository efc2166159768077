//! User account entity
//!
//! Table and column names keep the legacy upper-case layout.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "USERDEFN")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_name = "EMAILID")]
    pub email_id: String,
    #[sea_orm(column_name = "UNIQUEID")]
    pub unique_id: String,
    #[sea_orm(column_name = "FULLNAMEDESC")]
    pub full_name_desc: String,
    /// Argon2id PHC string
    #[sea_orm(column_name = "USERPSWD")]
    pub user_pswd: String,
    #[sea_orm(column_name = "LANGUAGE_CODE")]
    pub language_code: String,
    #[sea_orm(column_name = "CURRENCY_CODE")]
    pub currency_code: String,
    #[sea_orm(column_name = "LASTPSWDCHANGE")]
    pub last_pswd_change: Option<DateTimeUtc>,
    #[sea_orm(column_name = "ACCTLOCK")]
    pub acct_lock: i32,
    #[sea_orm(column_name = "ISSIGNEDIN")]
    pub is_signed_in: i32,
    #[sea_orm(column_name = "DEFAULTHOME")]
    pub default_home: String,
    #[sea_orm(column_name = "FAILEDLOGINS")]
    pub failed_logins: i32,
    #[sea_orm(column_name = "CREATEDETTM")]
    pub created_dttm: Option<DateTimeUtc>,
    #[sea_orm(column_name = "LASTSIGNONDTTM")]
    pub last_sign_on_dttm: Option<DateTimeUtc>,
    #[sea_orm(column_name = "LASTSIGNOFFDTTM")]
    pub last_sign_off_dttm: Option<DateTimeUtc>,
    #[sea_orm(column_name = "LASTUPDDTTM")]
    pub last_upd_dttm: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
