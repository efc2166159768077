//! 访问日志与 link_analytics 聚合表
//!
//! 一次访问 = 一行 url_access_logs + 对应 link_analytics 行的累加，
//! 两者在同一个事务里完成。

use chrono::Utc;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseTransaction, DbBackend, DbErr,
    EntityTrait, ExprTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    sea_query::Expr, sea_query::OnConflict,
};
use tracing::debug;

use super::SeaOrmStorage;
use super::converters::{increment_count, model_to_analytics};
use super::retry;
use crate::errors::{Result, UseThisLinkError};
use crate::storage::{AccessRecord, DailyVisitCount, LinkAnalyticsSummary, VisitType};

use migration::entities::{link_analytics, url_access_log};

#[derive(Debug, FromQueryResult)]
struct DayRow {
    day: Option<String>,
    count: i64,
}

impl SeaOrmStorage {
    /// 写入访问日志并更新聚合计数
    pub async fn record_access(&self, record: &AccessRecord) -> Result<()> {
        let db = &self.db;

        retry::with_retry(
            &format!("record_access({})", record.short_url),
            self.retry_config,
            || async {
                let txn = db.begin().await?;
                // 第一条语句必须是写，SQLite 才会在拿写锁时等待而不是在快照上失败
                seed_link_analytics(&txn, record).await?;
                insert_access_log(&txn, record).await?;
                let first_visit = is_first_visit(&txn, record).await?;
                bump_link_analytics(&txn, record, first_visit).await?;
                txn.commit().await
            },
        )
        .await
        .map_err(|e| UseThisLinkError::database_operation(format!("记录访问失败: {}", e)))?;

        debug!(
            "Access recorded for {} ({}, {})",
            record.short_url, record.country, record.browser
        );
        Ok(())
    }

    pub async fn get_link_analytics(&self, code: &str) -> Result<Option<LinkAnalyticsSummary>> {
        let model = link_analytics::Entity::find_by_id(code.to_string())
            .one(&self.db)
            .await
            .map_err(|e| UseThisLinkError::database_operation(format!("查询统计失败: {}", e)))?;

        Ok(model.map(model_to_analytics))
    }

    /// 某个短码的访问日志条数（不含软删除）
    pub async fn count_access_logs(&self, code: &str) -> Result<u64> {
        url_access_log::Entity::find()
            .filter(url_access_log::Column::ShortUrl.eq(code))
            .filter(url_access_log::Column::DeletedAt.is_null())
            .count(&self.db)
            .await
            .map_err(|e| UseThisLinkError::database_operation(format!("统计访问日志失败: {}", e)))
    }

    /// 按天统计全部访问量
    pub async fn daily_visit_counts(&self) -> Result<Vec<DailyVisitCount>> {
        let day_expr = self.day_expr("accessed_at");

        let rows = url_access_log::Entity::find()
            .select_only()
            .column_as(day_expr.clone(), "day")
            .column_as(url_access_log::Column::Id.count(), "count")
            .filter(url_access_log::Column::DeletedAt.is_null())
            .group_by(day_expr)
            .order_by_asc(Expr::cust("day"))
            .into_model::<DayRow>()
            .all(&self.db)
            .await
            .map_err(|e| UseThisLinkError::database_operation(format!("按天统计失败: {}", e)))?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                row.day.map(|day| DailyVisitCount {
                    day,
                    count: row.count,
                })
            })
            .collect())
    }
}

/// 该会话此前是否访问过这个短码，需在本次日志写入之后调用
async fn is_first_visit(
    txn: &DatabaseTransaction,
    record: &AccessRecord,
) -> std::result::Result<bool, DbErr> {
    let Some(session_id) = record.session_id.as_deref() else {
        return Ok(true);
    };

    let visits = url_access_log::Entity::find()
        .filter(url_access_log::Column::ShortUrl.eq(record.short_url.as_str()))
        .filter(url_access_log::Column::SessionId.eq(session_id))
        .count(txn)
        .await?;

    Ok(visits == 1)
}

async fn insert_access_log(
    txn: &DatabaseTransaction,
    record: &AccessRecord,
) -> std::result::Result<(), DbErr> {
    let model = url_access_log::ActiveModel {
        short_url: Set(record.short_url.clone()),
        session_id: Set(record.session_id.clone()),
        ip_address: Set(record.ip_address.clone()),
        user_agent: Set(record.user_agent.clone()),
        referrer: Set(record.referrer.clone()),
        accessed_at: Set(record.accessed_at),
        visit_type: Set(record.visit_type.to_string()),
        city: Set(Some(record.city.clone())),
        country: Set(Some(record.country.clone())),
        browser: Set(Some(record.browser.clone())),
        device: Set(Some(record.device.clone())),
        operating_system: Set(Some(record.operating_system.clone())),
        deleted_at: Set(None),
        ..Default::default()
    };

    url_access_log::Entity::insert(model).exec(txn).await?;
    Ok(())
}

/// 先保证聚合行存在，并发的首次访问不会撞主键
async fn seed_link_analytics(
    txn: &DatabaseTransaction,
    record: &AccessRecord,
) -> std::result::Result<(), DbErr> {
    let seed = link_analytics::ActiveModel {
        short_url: Set(record.short_url.clone()),
        total_visits: Set(0),
        unique_visitors: Set(0),
        redirect_count: Set(0),
        preview_count: Set(0),
        country_counts: Set(None),
        browser_counts: Set(None),
        device_counts: Set(None),
        last_updated: Set(Utc::now()),
    };
    match link_analytics::Entity::insert(seed)
        .on_conflict(
            OnConflict::column(link_analytics::Column::ShortUrl)
                .do_nothing()
                .to_owned(),
        )
        .exec(txn)
        .await
    {
        Ok(_) | Err(DbErr::RecordNotInserted) => {}
        Err(e) => {
            let err_str = e.to_string().to_lowercase();
            if !(err_str.contains("no rows") || err_str.contains("record not inserted")) {
                return Err(e);
            }
        }
    }

    Ok(())
}

async fn bump_link_analytics(
    txn: &DatabaseTransaction,
    record: &AccessRecord,
    first_visit: bool,
) -> std::result::Result<(), DbErr> {
    let now = Utc::now();
    let unique = i64::from(first_visit);
    let (redirects, previews) = match record.visit_type {
        VisitType::Redirect => (1i64, 0i64),
        VisitType::Preview => (0, 1),
    };

    // JSON 计数是读改写，PostgreSQL/MySQL 上要锁住这一行；SQLite 事务本身已串行
    let mut query = link_analytics::Entity::find_by_id(record.short_url.clone());
    if txn.get_database_backend() != DbBackend::Sqlite {
        query = query.lock_exclusive();
    }
    let existing = query
        .one(txn)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(record.short_url.clone()))?;

    link_analytics::Entity::update_many()
        .col_expr(
            link_analytics::Column::TotalVisits,
            Expr::col(link_analytics::Column::TotalVisits).add(1),
        )
        .col_expr(
            link_analytics::Column::UniqueVisitors,
            Expr::col(link_analytics::Column::UniqueVisitors).add(unique),
        )
        .col_expr(
            link_analytics::Column::RedirectCount,
            Expr::col(link_analytics::Column::RedirectCount).add(redirects),
        )
        .col_expr(
            link_analytics::Column::PreviewCount,
            Expr::col(link_analytics::Column::PreviewCount).add(previews),
        )
        .col_expr(
            link_analytics::Column::CountryCounts,
            Expr::value(increment_count(
                existing.country_counts.as_deref(),
                &record.country,
            )),
        )
        .col_expr(
            link_analytics::Column::BrowserCounts,
            Expr::value(increment_count(
                existing.browser_counts.as_deref(),
                &record.browser,
            )),
        )
        .col_expr(
            link_analytics::Column::DeviceCounts,
            Expr::value(increment_count(
                existing.device_counts.as_deref(),
                &record.device,
            )),
        )
        .col_expr(link_analytics::Column::LastUpdated, Expr::value(now))
        .filter(link_analytics::Column::ShortUrl.eq(record.short_url.as_str()))
        .exec(txn)
        .await?;

    Ok(())
}
