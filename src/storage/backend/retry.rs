//! 瞬时数据库错误重试
//!
//! 回填的计数查询与 upsert、状态写入事务都经过这里。连接获取失败、死锁、
//! 序列化失败、SQLite BUSY 按指数退避 + 抖动重试；其余错误立即返回，
//! 由 [`into_storage_error`] 转成 `MsgstatsError`。

use sea_orm::DbErr;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;
use crate::errors::{MsgstatsError, Result as StatsResult};

/// 经过重试包装的存储操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOp {
    /// 某组织某天窗口内的去重入站联系人计数
    CountInboundContacts,
    /// 写入 (org, day) 计数行
    UpsertUniqueContactCount,
    ListUniqueContactCounts,
    /// 状态写入事务，触发器在其中累加群发统计
    UpdateStatus,
    ListActiveOrgs,
    FindActiveOrg,
    GetBroadcastStatistics,
    CreateBroadcastStatistics,
}

impl StorageOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageOp::CountInboundContacts => "count_unique_inbound_contacts",
            StorageOp::UpsertUniqueContactCount => "upsert_unique_contact_count",
            StorageOp::ListUniqueContactCounts => "list_unique_contact_counts",
            StorageOp::UpdateStatus => "update_status",
            StorageOp::ListActiveOrgs => "list_active_orgs",
            StorageOp::FindActiveOrg => "find_active_org",
            StorageOp::GetBroadcastStatistics => "get_broadcast_statistics",
            StorageOp::CreateBroadcastStatistics => "create_broadcast_statistics",
        }
    }
}

impl fmt::Display for StorageOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 把重试后仍失败的 `DbErr` 转成业务错误
///
/// 连接类错误归为 `DatabaseConnection`；`Custom` 是事务内发现的数据问题，
/// 归为 `Validation`。
pub fn into_storage_error(op: StorageOp, err: DbErr) -> MsgstatsError {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => {
            MsgstatsError::database_connection(format!("{} failed: {}", op, err))
        }
        DbErr::RecordNotFound(what) => MsgstatsError::not_found(format!("{}: {}", op, what)),
        DbErr::Custom(msg) => MsgstatsError::validation(msg),
        other => MsgstatsError::database_operation(format!("{} failed: {}", op, other)),
    }
}

/// 判断数据库错误是否可重试
pub fn is_retryable_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(runtime_err) | DbErr::Query(runtime_err) => {
            is_retryable_runtime_error(runtime_err)
        }
        _ => false,
    }
}

fn is_retryable_runtime_error(err: &sea_orm::error::RuntimeErr) -> bool {
    use sea_orm::error::RuntimeErr;

    match err {
        RuntimeErr::SqlxError(sqlx_err) => {
            use std::ops::Deref;
            if let Some(code) = sqlx_err
                .deref()
                .as_database_error()
                .and_then(|db_err| db_err.code())
            {
                return matches!(
                    code.as_ref(),
                    // MySQL: deadlock, lock wait timeout
                    "1213" | "1205" |
                    // PostgreSQL: serialization failure, deadlock
                    "40001" | "40P01" |
                    // SQLite: BUSY, LOCKED
                    "5" | "6"
                );
            }
            is_retryable_message(&sqlx_err.to_string().to_lowercase())
        }
        RuntimeErr::Internal(msg) => is_retryable_message(&msg.to_lowercase()),
        #[allow(unreachable_patterns)]
        _ => false,
    }
}

fn is_retryable_message(err_str: &str) -> bool {
    err_str.contains("deadlock")
        || err_str.contains("lock wait timeout")
        || err_str.contains("database is locked")
        || err_str.contains("serialization failure")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryConfig {
    pub fn from_database_config(config: &DatabaseConfig) -> Self {
        Self {
            max_retries: config.retry_count,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
        }
    }

    /// 不重试（测试与一次性命令使用）
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

/// 按指数退避重试 `operation`，直到成功、遇到不可重试错误或次数耗尽
pub async fn with_retry<T, F, Fut>(
    op: StorageOp,
    config: RetryConfig,
    mut operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(%op, retries = attempt, "Storage operation recovered");
                }
                return Ok(result);
            }
            Err(e) if is_retryable_error(&e) && attempt < config.max_retries => {
                attempt += 1;
                let delay = calculate_backoff(attempt, config.base_delay_ms, config.max_delay_ms);
                warn!(
                    "'{}' failed (attempt {}/{}): {}; retrying in {} ms",
                    op,
                    attempt,
                    config.max_retries + 1,
                    e,
                    delay
                );
                sleep(Duration::from_millis(delay)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// [`with_retry`] 加上错误转换
pub async fn retry_storage<T, F, Fut>(
    op: StorageOp,
    config: RetryConfig,
    operation: F,
) -> StatsResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    with_retry(op, config, operation)
        .await
        .map_err(|e| into_storage_error(op, e))
}

fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    use rand::RngExt;
    let exp_delay = base_ms.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
    let capped = exp_delay.min(max_ms);
    // 0-25% 抖动
    let jitter = rand::rng().random_range(0..=capped / 4);
    capped.saturating_add(jitter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::error::{ConnAcquireErr, RuntimeErr};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryConfig {
        RetryConfig {
            max_retries: 2,
            base_delay_ms: 5,
            max_delay_ms: 20,
        }
    }

    #[test]
    fn test_transient_errors_are_retryable() {
        assert!(is_retryable_error(&DbErr::ConnectionAcquire(
            ConnAcquireErr::Timeout
        )));
        assert!(is_retryable_error(&DbErr::Query(RuntimeErr::Internal(
            "database is locked".to_string()
        ))));
        assert!(is_retryable_error(&DbErr::Exec(RuntimeErr::Internal(
            "Deadlock found when trying to get lock".to_string()
        ))));
    }

    #[test]
    fn test_logical_errors_are_not_retryable() {
        assert!(!is_retryable_error(&DbErr::RecordNotFound("msg".to_string())));
        assert!(!is_retryable_error(&DbErr::Exec(RuntimeErr::Internal(
            "UNIQUE constraint failed".to_string()
        ))));
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        assert!((100..=125).contains(&calculate_backoff(1, 100, 2000)));
        assert!((400..=500).contains(&calculate_backoff(3, 100, 2000)));
        assert!((2000..=2500).contains(&calculate_backoff(12, 100, 2000)));
    }

    #[test]
    fn test_retry_config_reads_database_section() {
        let db = DatabaseConfig {
            retry_count: 7,
            retry_base_delay_ms: 10,
            retry_max_delay_ms: 90,
            ..DatabaseConfig::default()
        };
        let cfg = RetryConfig::from_database_config(&db);
        assert_eq!(cfg.max_retries, 7);
        assert_eq!(cfg.base_delay_ms, 10);
        assert_eq!(cfg.max_delay_ms, 90);
    }

    #[tokio::test]
    async fn test_with_retry_recovers_from_busy() {
        let calls = AtomicU32::new(0);
        let result = with_retry(StorageOp::CountInboundContacts, fast(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(DbErr::Query(RuntimeErr::Internal(
                        "database is locked".to_string(),
                    )))
                } else {
                    Ok(3u64)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_with_retry_gives_up_after_budget() {
        let calls = AtomicU32::new(0);
        let result = with_retry(StorageOp::UpsertUniqueContactCount, fast(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout)) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_with_retry_does_not_repeat_logical_errors() {
        let calls = AtomicU32::new(0);
        let result = with_retry(StorageOp::UpdateStatus, RetryConfig::default(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(DbErr::RecordNotFound("msg 1".to_string())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_storage_maps_errors() {
        let err = retry_storage(StorageOp::UpsertUniqueContactCount, fast(), || async {
            Err::<(), _>(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, MsgstatsError::DatabaseConnection(ref m) if m.starts_with("upsert_unique_contact_count")));

        let err = retry_storage(StorageOp::UpdateStatus, fast(), || async {
            Err::<(), _>(DbErr::Custom("unknown stored status".to_string()))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, MsgstatsError::Validation(_)));

        let err = into_storage_error(
            StorageOp::CountInboundContacts,
            DbErr::Exec(RuntimeErr::Internal("syntax error".to_string())),
        );
        assert!(matches!(err, MsgstatsError::DatabaseOperation(ref m) if m.contains("count_unique_inbound_contacts")));
    }
}
