//! sessions 表的读写

use chrono::Utc;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, sea_query::Expr,
    sea_query::OnConflict,
};
use tracing::debug;

use super::SeaOrmStorage;
use super::retry;
use crate::errors::{Result, UseThisLinkError};

use migration::entities::session;

impl SeaOrmStorage {
    /// 记录会话（已存在时忽略）
    pub async fn ensure_session(
        &self,
        session_id: &str,
        user_agent: Option<&str>,
        ip_address: Option<&str>,
    ) -> Result<()> {
        let db = &self.db;

        let result = retry::with_retry(
            &format!("ensure_session({})", session_id),
            self.retry_config,
            || async {
                let model = session::ActiveModel {
                    session_id: Set(session_id.to_string()),
                    user_agent: Set(user_agent.map(str::to_string)),
                    ip_address: Set(ip_address.map(str::to_string)),
                    user_email: Set(None),
                    created_at: Set(Utc::now()),
                };
                session::Entity::insert(model)
                    .on_conflict(
                        OnConflict::column(session::Column::SessionId)
                            .do_nothing()
                            .to_owned(),
                    )
                    .exec(db)
                    .await
            },
        )
        .await;

        match result {
            Ok(_) => {
                debug!("Session recorded: {}", session_id);
                Ok(())
            }
            Err(sea_orm::DbErr::RecordNotInserted) => Ok(()),
            Err(e) => {
                let err_str = e.to_string().to_lowercase();
                if err_str.contains("no rows") || err_str.contains("record not inserted") {
                    Ok(())
                } else {
                    Err(UseThisLinkError::database_operation(format!(
                        "记录会话失败: {}",
                        e
                    )))
                }
            }
        }
    }

    /// 会话绑定的用户邮箱（未登录或会话不存在时为 None）
    pub async fn get_session_email(&self, session_id: &str) -> Result<Option<String>> {
        let db = &self.db;

        let model = retry::with_retry(
            &format!("get_session({})", session_id),
            self.retry_config,
            || async { session::Entity::find_by_id(session_id.to_string()).one(db).await },
        )
        .await
        .map_err(|e| UseThisLinkError::database_operation(format!("查询会话失败: {}", e)))?;

        Ok(model
            .and_then(|m| m.user_email)
            .filter(|email| !email.is_empty()))
    }

    /// 绑定或解绑会话的用户邮箱
    pub async fn set_session_email(&self, session_id: &str, email: Option<&str>) -> Result<()> {
        session::Entity::update_many()
            .col_expr(
                session::Column::UserEmail,
                Expr::value(email.map(str::to_string)),
            )
            .filter(session::Column::SessionId.eq(session_id))
            .exec(&self.db)
            .await
            .map_err(|e| UseThisLinkError::database_operation(format!("更新会话失败: {}", e)))?;

        Ok(())
    }
}
