//! 初始表迁移
//!
//! 创建 url_mappings（短链接映射）和 sessions（浏览器会话）两张表。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 url_mappings 表
        manager
            .create_table(
                Table::create()
                    .table(UrlMappings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UrlMappings::ShortUrl)
                            .string_len(16)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UrlMappings::OriginalUrl).text().not_null())
                    .col(ColumnDef::new(UrlMappings::SessionId).string_len(64).not_null())
                    .col(ColumnDef::new(UrlMappings::UserEmail).string().null())
                    .col(
                        ColumnDef::new(UrlMappings::Visits)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UrlMappings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UrlMappings::ExpiryDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UrlMappings::IsLoggedIn)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        // 历史查询按 session / user 过滤
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_url_mappings_session_id")
                    .table(UrlMappings::Table)
                    .col(UrlMappings::SessionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_url_mappings_user_email")
                    .table(UrlMappings::Table)
                    .col(UrlMappings::UserEmail)
                    .to_owned(),
            )
            .await?;

        // 创建 sessions 表
        manager
            .create_table(
                Table::create()
                    .table(Sessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sessions::SessionId)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sessions::UserAgent).text().null())
                    .col(ColumnDef::new(Sessions::IpAddress).string_len(45).null())
                    .col(ColumnDef::new(Sessions::UserEmail).string().null())
                    .col(
                        ColumnDef::new(Sessions::CreatedAt)
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
            .drop_table(Table::drop().table(Sessions::Table).to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_url_mappings_user_email").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_url_mappings_session_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(UrlMappings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UrlMappings {
    Table,
    ShortUrl,
    OriginalUrl,
    SessionId,
    UserEmail,
    Visits,
    CreatedAt,
    ExpiryDate,
    IsLoggedIn,
}

#[derive(DeriveIden)]
enum Sessions {
    Table,
    SessionId,
    UserAgent,
    IpAddress,
    UserEmail,
    CreatedAt,
}
