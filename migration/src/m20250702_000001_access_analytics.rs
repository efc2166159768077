//! 访问日志与聚合统计迁移
//!
//! - url_access_logs: 每次重定向 / 预览一行
//! - link_analytics: 每个短码一行的聚合计数（国家、浏览器、设备计数以 JSON 文本保存）

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UrlAccessLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UrlAccessLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UrlAccessLogs::ShortUrl)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(UrlAccessLogs::SessionId).string_len(64).null())
                    .col(ColumnDef::new(UrlAccessLogs::IpAddress).string_len(45).null())
                    .col(ColumnDef::new(UrlAccessLogs::UserAgent).text().null())
                    .col(ColumnDef::new(UrlAccessLogs::Referrer).text().null())
                    .col(
                        ColumnDef::new(UrlAccessLogs::AccessedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UrlAccessLogs::VisitType)
                            .string_len(16)
                            .not_null()
                            .default("redirect"),
                    )
                    .col(ColumnDef::new(UrlAccessLogs::City).string_len(100).null())
                    .col(ColumnDef::new(UrlAccessLogs::Country).string_len(100).null())
                    .col(ColumnDef::new(UrlAccessLogs::Browser).string_len(100).null())
                    .col(ColumnDef::new(UrlAccessLogs::Device).string_len(32).null())
                    .col(
                        ColumnDef::new(UrlAccessLogs::OperatingSystem)
                            .string_len(100)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UrlAccessLogs::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 单链接 + session 查询（unique visitor 判定）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_access_logs_code_session")
                    .table(UrlAccessLogs::Table)
                    .col(UrlAccessLogs::ShortUrl)
                    .col(UrlAccessLogs::SessionId)
                    .to_owned(),
            )
            .await?;

        // 按天统计
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_access_logs_accessed_at")
                    .table(UrlAccessLogs::Table)
                    .col(UrlAccessLogs::AccessedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LinkAnalytics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LinkAnalytics::ShortUrl)
                            .string_len(16)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LinkAnalytics::TotalVisits)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LinkAnalytics::UniqueVisitors)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LinkAnalytics::RedirectCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LinkAnalytics::PreviewCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(LinkAnalytics::CountryCounts).text().null())
                    .col(ColumnDef::new(LinkAnalytics::BrowserCounts).text().null())
                    .col(ColumnDef::new(LinkAnalytics::DeviceCounts).text().null())
                    .col(
                        ColumnDef::new(LinkAnalytics::LastUpdated)
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
            .drop_table(Table::drop().table(LinkAnalytics::Table).to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_access_logs_accessed_at").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_access_logs_code_session").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(UrlAccessLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UrlAccessLogs {
    Table,
    Id,
    ShortUrl,
    SessionId,
    IpAddress,
    UserAgent,
    Referrer,
    AccessedAt,
    VisitType,
    City,
    Country,
    Browser,
    Device,
    OperatingSystem,
    DeletedAt,
}

#[derive(DeriveIden)]
enum LinkAnalytics {
    #[sea_orm(iden = "link_analytics")]
    Table,
    ShortUrl,
    TotalVisits,
    UniqueVisitors,
    RedirectCount,
    PreviewCount,
    CountryCounts,
    BrowserCounts,
    DeviceCounts,
    LastUpdated,
}
