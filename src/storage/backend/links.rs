//! url_mappings 表的读写

use sea_orm::{
    ColumnTrait, Condition, EntityTrait, ExprTrait, QueryFilter, QueryOrder, sea_query::Expr,
    sea_query::OnConflict,
};
use tracing::{debug, info};

use super::SeaOrmStorage;
use super::converters::{model_to_shortlink, shortlink_to_active_model};
use super::retry;
use crate::errors::{Result, UseThisLinkError};
use crate::storage::ShortLink;

use migration::entities::url_mapping;

impl SeaOrmStorage {
    /// 插入短链接，短码已存在时不做任何修改
    ///
    /// 返回值:
    /// - `Ok(true)`: 插入成功
    /// - `Ok(false)`: 短码已被占用
    pub async fn insert_link_if_absent(&self, link: &ShortLink) -> Result<bool> {
        let db = &self.db;

        let result = retry::with_retry(
            &format!("insert_link({})", link.code),
            self.retry_config,
            || async {
                url_mapping::Entity::insert(shortlink_to_active_model(link))
                    .on_conflict(
                        OnConflict::column(url_mapping::Column::ShortUrl)
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
                debug!("Short link inserted: {}", link.code);
                Ok(true)
            }
            Err(sea_orm::DbErr::RecordNotInserted) => Ok(false),
            Err(e) => {
                // 某些数据库后端在 do_nothing 时可能返回特定错误
                let err_str = e.to_string().to_lowercase();
                if err_str.contains("no rows") || err_str.contains("record not inserted") {
                    Ok(false)
                } else {
                    Err(UseThisLinkError::database_operation(format!(
                        "插入短链接 '{}' 失败: {}",
                        link.code, e
                    )))
                }
            }
        }
    }

    pub async fn get_link(&self, code: &str) -> Result<Option<ShortLink>> {
        let db = &self.db;
        let code_owned = code.to_string();

        let model = retry::with_retry(&format!("get_link({})", code), self.retry_config, || async {
            url_mapping::Entity::find_by_id(code_owned.clone()).one(db).await
        })
        .await
        .map_err(|e| UseThisLinkError::database_operation(format!("查询短链接失败: {}", e)))?;

        Ok(model.map(model_to_shortlink))
    }

    /// 访问计数原子加一
    pub async fn increment_visits(&self, code: &str) -> Result<()> {
        let db = &self.db;
        let code_owned = code.to_string();

        retry::with_retry(
            &format!("increment_visits({})", code),
            self.retry_config,
            || async {
                url_mapping::Entity::update_many()
                    .col_expr(
                        url_mapping::Column::Visits,
                        Expr::col(url_mapping::Column::Visits).add(1),
                    )
                    .filter(url_mapping::Column::ShortUrl.eq(code_owned.as_str()))
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| UseThisLinkError::database_operation(format!("更新访问计数失败: {}", e)))?;

        Ok(())
    }

    /// 当前会话创建的链接，以及（登录时）该用户名下的链接，按创建时间倒序
    pub async fn list_history(
        &self,
        session_id: &str,
        user_email: Option<&str>,
    ) -> Result<Vec<ShortLink>> {
        let mut condition = Condition::any().add(url_mapping::Column::SessionId.eq(session_id));
        if let Some(email) = user_email.filter(|e| !e.is_empty()) {
            condition = condition.add(url_mapping::Column::UserEmail.eq(email));
        }

        let models = url_mapping::Entity::find()
            .filter(condition)
            .order_by_desc(url_mapping::Column::CreatedAt)
            .order_by_desc(url_mapping::Column::ShortUrl)
            .all(&self.db)
            .await
            .map_err(|e| UseThisLinkError::database_operation(format!("查询历史记录失败: {}", e)))?;

        Ok(models.into_iter().map(model_to_shortlink).collect())
    }

    /// 登录后把会话里的匿名链接归到用户名下
    pub async fn claim_session_links(&self, session_id: &str, email: &str) -> Result<u64> {
        let result = url_mapping::Entity::update_many()
            .col_expr(url_mapping::Column::UserEmail, Expr::value(email))
            .col_expr(url_mapping::Column::IsLoggedIn, Expr::value(true))
            .filter(url_mapping::Column::SessionId.eq(session_id))
            .filter(
                Condition::any()
                    .add(url_mapping::Column::UserEmail.is_null())
                    .add(url_mapping::Column::UserEmail.eq("")),
            )
            .exec(&self.db)
            .await
            .map_err(|e| UseThisLinkError::database_operation(format!("迁移会话链接失败: {}", e)))?;

        if result.rows_affected > 0 {
            info!(
                "Claimed {} anonymous links of session {} for {}",
                result.rows_affected, session_id, email
            );
        }
        Ok(result.rows_affected)
    }
}
