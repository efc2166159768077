//! 用户账户迁移
//!
//! 创建 USERDEFN（用户表）和 pending_registrations（待验证注册）表。
//! 列名沿用大写风格，与既有数据库保持兼容。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserDefn::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserDefn::EmailId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserDefn::UniqueId).string().not_null())
                    .col(
                        ColumnDef::new(UserDefn::FullNameDesc)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(UserDefn::UserPswd).string().not_null())
                    .col(
                        ColumnDef::new(UserDefn::LanguageCode)
                            .string_len(8)
                            .not_null()
                            .default("ENG"),
                    )
                    .col(
                        ColumnDef::new(UserDefn::CurrencyCode)
                            .string_len(8)
                            .not_null()
                            .default("INR"),
                    )
                    .col(
                        ColumnDef::new(UserDefn::LastPswdChange)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UserDefn::AcctLock)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserDefn::IsSignedIn)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserDefn::DefaultHome)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(UserDefn::FailedLogins)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserDefn::CreatedDttm)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UserDefn::LastSignOnDttm)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UserDefn::LastSignOffDttm)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UserDefn::LastUpdDttm)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PendingRegistrations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PendingRegistrations::EmailId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PendingRegistrations::Otp)
                            .string_len(6)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingRegistrations::OtpExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingRegistrations::UserPswd)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingRegistrations::UniqueId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingRegistrations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PendingRegistrations::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(UserDefn::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserDefn {
    #[sea_orm(iden = "USERDEFN")]
    Table,
    #[sea_orm(iden = "EMAILID")]
    EmailId,
    #[sea_orm(iden = "UNIQUEID")]
    UniqueId,
    #[sea_orm(iden = "FULLNAMEDESC")]
    FullNameDesc,
    #[sea_orm(iden = "USERPSWD")]
    UserPswd,
    #[sea_orm(iden = "LANGUAGE_CODE")]
    LanguageCode,
    #[sea_orm(iden = "CURRENCY_CODE")]
    CurrencyCode,
    #[sea_orm(iden = "LASTPSWDCHANGE")]
    LastPswdChange,
    #[sea_orm(iden = "ACCTLOCK")]
    AcctLock,
    #[sea_orm(iden = "ISSIGNEDIN")]
    IsSignedIn,
    #[sea_orm(iden = "DEFAULTHOME")]
    DefaultHome,
    #[sea_orm(iden = "FAILEDLOGINS")]
    FailedLogins,
    #[sea_orm(iden = "CREATEDETTM")]
    CreatedDttm,
    #[sea_orm(iden = "LASTSIGNONDTTM")]
    LastSignOnDttm,
    #[sea_orm(iden = "LASTSIGNOFFDTTM")]
    LastSignOffDttm,
    #[sea_orm(iden = "LASTUPDDTTM")]
    LastUpdDttm,
}

#[derive(DeriveIden)]
enum PendingRegistrations {
    #[sea_orm(iden = "pending_registrations")]
    Table,
    #[sea_orm(iden = "EMAILID")]
    EmailId,
    #[sea_orm(iden = "OTP")]
    Otp,
    #[sea_orm(iden = "OTP_EXPIRES_AT")]
    OtpExpiresAt,
    #[sea_orm(iden = "USERPSWD")]
    UserPswd,
    #[sea_orm(iden = "UNIQUEID")]
    UniqueId,
    #[sea_orm(iden = "CREATED_AT")]
    CreatedAt,
}
