//! USERDEFN 与 pending_registrations 表的读写

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, EntityTrait, ExprTrait, QueryFilter, TransactionTrait,
    sea_query::Expr, sea_query::OnConflict,
};
use tracing::{info, warn};

use super::SeaOrmStorage;
use super::converters::{model_to_pending, model_to_user};
use super::retry;
use crate::errors::{Result, UseThisLinkError};
use crate::storage::{FailedLoginOutcome, PendingRegistration, UserAccount};

use migration::entities::{pending_registration, user};

impl SeaOrmStorage {
    pub async fn get_user(&self, email: &str) -> Result<Option<UserAccount>> {
        let db = &self.db;

        let model = retry::with_retry(&format!("get_user({})", email), self.retry_config, || async {
            user::Entity::find_by_id(email.to_string()).one(db).await
        })
        .await
        .map_err(|e| UseThisLinkError::database_operation(format!("查询用户失败: {}", e)))?;

        Ok(model.map(model_to_user))
    }

    /// 写入待验证注册；同一邮箱再次注册时覆盖 OTP、密码和过期时间
    pub async fn upsert_pending_registration(&self, pending: &PendingRegistration) -> Result<()> {
        let db = &self.db;

        retry::with_retry(
            &format!("upsert_pending({})", pending.email),
            self.retry_config,
            || async {
                let model = pending_registration::ActiveModel {
                    email_id: Set(pending.email.clone()),
                    otp: Set(pending.otp.clone()),
                    otp_expires_at: Set(pending.otp_expires_at),
                    user_pswd: Set(pending.password_hash.clone()),
                    unique_id: Set(pending.unique_id.clone()),
                    created_at: Set(pending.created_at),
                };
                pending_registration::Entity::insert(model)
                    .on_conflict(
                        OnConflict::column(pending_registration::Column::EmailId)
                            .update_columns([
                                pending_registration::Column::Otp,
                                pending_registration::Column::OtpExpiresAt,
                                pending_registration::Column::UserPswd,
                                pending_registration::Column::UniqueId,
                                pending_registration::Column::CreatedAt,
                            ])
                            .to_owned(),
                    )
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| {
            UseThisLinkError::database_operation(format!("保存待验证注册失败: {}", e))
        })?;

        Ok(())
    }

    pub async fn get_pending_registration(
        &self,
        email: &str,
    ) -> Result<Option<PendingRegistration>> {
        let model = pending_registration::Entity::find_by_id(email.to_string())
            .one(&self.db)
            .await
            .map_err(|e| {
                UseThisLinkError::database_operation(format!("查询待验证注册失败: {}", e))
            })?;

        Ok(model.map(model_to_pending))
    }

    /// 在一个事务里创建账户并删除待验证记录
    pub async fn complete_registration(&self, pending: &PendingRegistration) -> Result<()> {
        let now = Utc::now();

        let txn = self.db.begin().await.map_err(|e| {
            UseThisLinkError::database_operation(format!("开始事务失败: {}", e))
        })?;

        let account = user::ActiveModel {
            email_id: Set(pending.email.clone()),
            unique_id: Set(pending.unique_id.clone()),
            full_name_desc: Set(String::new()),
            user_pswd: Set(pending.password_hash.clone()),
            language_code: Set("ENG".to_string()),
            currency_code: Set("INR".to_string()),
            last_pswd_change: Set(Some(now)),
            acct_lock: Set(0),
            is_signed_in: Set(0),
            default_home: Set(String::new()),
            failed_logins: Set(0),
            created_dttm: Set(Some(now)),
            last_sign_on_dttm: Set(None),
            last_sign_off_dttm: Set(None),
            last_upd_dttm: Set(Some(now)),
        };

        user::Entity::insert(account).exec(&txn).await.map_err(|e| {
            let msg = e.to_string().to_lowercase();
            if msg.contains("unique") || msg.contains("duplicate") {
                UseThisLinkError::conflict(
                    "An account with this email already exists. Please log in or use a different email.",
                )
            } else {
                UseThisLinkError::database_operation(format!("创建用户失败: {}", e))
            }
        })?;

        pending_registration::Entity::delete_by_id(pending.email.clone())
            .exec(&txn)
            .await
            .map_err(|e| {
                UseThisLinkError::database_operation(format!("删除待验证注册失败: {}", e))
            })?;

        txn.commit().await.map_err(|e| {
            UseThisLinkError::database_operation(format!("提交事务失败: {}", e))
        })?;

        info!("User registered: {}", pending.email);
        Ok(())
    }

    /// 登录失败：FAILEDLOGINS + 1，达到上限时锁定账户
    pub async fn record_failed_login(
        &self,
        email: &str,
        max_failed_logins: i32,
    ) -> Result<FailedLoginOutcome> {
        let now = Utc::now();

        let txn = self.db.begin().await.map_err(|e| {
            UseThisLinkError::database_operation(format!("开始事务失败: {}", e))
        })?;

        user::Entity::update_many()
            .col_expr(
                user::Column::FailedLogins,
                Expr::col(user::Column::FailedLogins).add(1),
            )
            .col_expr(user::Column::LastUpdDttm, Expr::value(Some(now)))
            .filter(user::Column::EmailId.eq(email))
            .exec(&txn)
            .await
            .map_err(|e| UseThisLinkError::database_operation(format!("更新失败次数失败: {}", e)))?;

        user::Entity::update_many()
            .col_expr(user::Column::AcctLock, Expr::value(1))
            .filter(user::Column::EmailId.eq(email))
            .filter(user::Column::FailedLogins.gte(max_failed_logins))
            .exec(&txn)
            .await
            .map_err(|e| UseThisLinkError::database_operation(format!("锁定账户失败: {}", e)))?;

        let model = user::Entity::find_by_id(email.to_string())
            .one(&txn)
            .await
            .map_err(|e| UseThisLinkError::database_operation(format!("查询用户失败: {}", e)))?
            .ok_or_else(|| UseThisLinkError::not_found(format!("用户不存在: {}", email)))?;

        txn.commit().await.map_err(|e| {
            UseThisLinkError::database_operation(format!("提交事务失败: {}", e))
        })?;

        let outcome = FailedLoginOutcome {
            failed_logins: model.failed_logins,
            locked: model.acct_lock != 0,
        };
        if outcome.locked {
            warn!(
                "Account {} locked after {} failed logins",
                email, outcome.failed_logins
            );
        }
        Ok(outcome)
    }

    /// 登录成功：清零失败次数并标记已登录
    pub async fn record_successful_login(&self, email: &str, at: DateTime<Utc>) -> Result<()> {
        user::Entity::update_many()
            .col_expr(user::Column::FailedLogins, Expr::value(0))
            .col_expr(user::Column::IsSignedIn, Expr::value(1))
            .col_expr(user::Column::LastSignOnDttm, Expr::value(Some(at)))
            .col_expr(user::Column::LastUpdDttm, Expr::value(Some(at)))
            .filter(user::Column::EmailId.eq(email))
            .exec(&self.db)
            .await
            .map_err(|e| UseThisLinkError::database_operation(format!("更新登录状态失败: {}", e)))?;

        Ok(())
    }

    /// 退出登录：清除已登录标记
    pub async fn record_logout(&self, email: &str, at: DateTime<Utc>) -> Result<()> {
        user::Entity::update_many()
            .col_expr(user::Column::IsSignedIn, Expr::value(0))
            .col_expr(user::Column::LastSignOffDttm, Expr::value(Some(at)))
            .col_expr(user::Column::LastUpdDttm, Expr::value(Some(at)))
            .filter(user::Column::EmailId.eq(email))
            .exec(&self.db)
            .await
            .map_err(|e| UseThisLinkError::database_operation(format!("更新退出状态失败: {}", e)))?;

        Ok(())
    }
}
