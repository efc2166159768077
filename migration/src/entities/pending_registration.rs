use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "pending_registrations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_name = "EMAILID")]
    pub email_id: String,
    #[sea_orm(column_name = "OTP")]
    pub otp: String,
    #[sea_orm(column_name = "OTP_EXPIRES_AT")]
    pub otp_expires_at: DateTimeUtc,
    #[sea_orm(column_name = "USERPSWD")]
    pub user_pswd: String,
    #[sea_orm(column_name = "UNIQUEID")]
    pub unique_id: String,
    #[sea_orm(column_name = "CREATED_AT")]
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
