//! 群发统计状态触发器
//!
//! 消息状态变化时在同一事务内原子累加 broadcast_statistics 计数：
//! - → S: sent + 1，cost + template_price
//! - → D: delivered + 1
//! - → F: failed + 1，若原状态为 Q 则 processed + 1
//! - → W: processed + 1，刷新 modified_on
//! - → V: read + 1
//!
//! 只处理 is_bulk_send 的群发，状态未变化时不触发。

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

pub const TRIGGER_NAME: &str = "trg_broadcast_statistics_on_msg_status";
const PG_FUNCTION_NAME: &str = "broadcast_statistics_on_msg_status";

const PG_FUNCTION: &str = r#"
CREATE OR REPLACE FUNCTION broadcast_statistics_on_msg_status()
RETURNS TRIGGER AS $$
BEGIN
    IF NOT EXISTS (
        SELECT 1 FROM broadcasts WHERE id = NEW.broadcast_id AND is_bulk_send = TRUE
    ) THEN
        RETURN NEW;
    END IF;

    UPDATE broadcast_statistics
    SET
        sent = sent + CASE WHEN NEW.status = 'S' THEN 1 ELSE 0 END,
        delivered = delivered + CASE WHEN NEW.status = 'D' THEN 1 ELSE 0 END,
        failed = failed + CASE WHEN NEW.status = 'F' THEN 1 ELSE 0 END,
        "read" = "read" + CASE WHEN NEW.status = 'V' THEN 1 ELSE 0 END,
        processed = processed + CASE
            WHEN NEW.status = 'W' THEN 1
            WHEN NEW.status = 'F' AND OLD.status = 'Q' THEN 1
            ELSE 0
        END,
        cost = cost + CASE WHEN NEW.status = 'S' THEN COALESCE(NEW.template_price, 0) ELSE 0 END,
        modified_on = CASE WHEN NEW.status = 'W' THEN NOW() ELSE modified_on END
    WHERE broadcast_id = NEW.broadcast_id;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;
"#;

const PG_TRIGGER: &str = r#"
CREATE TRIGGER trg_broadcast_statistics_on_msg_status
AFTER UPDATE OF status ON msgs
FOR EACH ROW
WHEN (
    NEW.broadcast_id IS NOT NULL
    AND OLD.status IS DISTINCT FROM NEW.status
    AND NEW.status IN ('S', 'D', 'F', 'W', 'V')
)
EXECUTE FUNCTION broadcast_statistics_on_msg_status();
"#;

// MySQL 触发器不支持 WHEN 子句，守卫条件放在 IF 中
const MYSQL_TRIGGER: &str = r#"
CREATE TRIGGER trg_broadcast_statistics_on_msg_status
AFTER UPDATE ON msgs
FOR EACH ROW
BEGIN
    IF NEW.broadcast_id IS NOT NULL
        AND NOT (OLD.status <=> NEW.status)
        AND NEW.status IN ('S', 'D', 'F', 'W', 'V')
        AND EXISTS (SELECT 1 FROM broadcasts WHERE id = NEW.broadcast_id AND is_bulk_send = 1)
    THEN
        UPDATE broadcast_statistics
        SET
            sent = sent + CASE WHEN NEW.status = 'S' THEN 1 ELSE 0 END,
            delivered = delivered + CASE WHEN NEW.status = 'D' THEN 1 ELSE 0 END,
            failed = failed + CASE WHEN NEW.status = 'F' THEN 1 ELSE 0 END,
            `read` = `read` + CASE WHEN NEW.status = 'V' THEN 1 ELSE 0 END,
            processed = processed + CASE
                WHEN NEW.status = 'W' THEN 1
                WHEN NEW.status = 'F' AND OLD.status = 'Q' THEN 1
                ELSE 0
            END,
            cost = cost + CASE WHEN NEW.status = 'S' THEN COALESCE(NEW.template_price, 0) ELSE 0 END,
            modified_on = CASE WHEN NEW.status = 'W' THEN UTC_TIMESTAMP(6) ELSE modified_on END
        WHERE broadcast_id = NEW.broadcast_id;
    END IF;
END
"#;

// SQLite 时间以 RFC3339 文本存储，与 sqlx 的编码保持一致
const SQLITE_TRIGGER: &str = r#"
CREATE TRIGGER IF NOT EXISTS trg_broadcast_statistics_on_msg_status
AFTER UPDATE OF status ON msgs
FOR EACH ROW
WHEN NEW.broadcast_id IS NOT NULL
    AND OLD.status IS NOT NEW.status
    AND NEW.status IN ('S', 'D', 'F', 'W', 'V')
    AND EXISTS (SELECT 1 FROM broadcasts WHERE id = NEW.broadcast_id AND is_bulk_send = 1)
BEGIN
    UPDATE broadcast_statistics
    SET
        sent = sent + CASE WHEN NEW.status = 'S' THEN 1 ELSE 0 END,
        delivered = delivered + CASE WHEN NEW.status = 'D' THEN 1 ELSE 0 END,
        failed = failed + CASE WHEN NEW.status = 'F' THEN 1 ELSE 0 END,
        "read" = "read" + CASE WHEN NEW.status = 'V' THEN 1 ELSE 0 END,
        processed = processed + CASE
            WHEN NEW.status = 'W' THEN 1
            WHEN NEW.status = 'F' AND OLD.status = 'Q' THEN 1
            ELSE 0
        END,
        cost = cost + CASE WHEN NEW.status = 'S' THEN COALESCE(NEW.template_price, 0) ELSE 0 END,
        modified_on = CASE
            WHEN NEW.status = 'W' THEN strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            ELSE modified_on
        END
    WHERE broadcast_id = NEW.broadcast_id;
END;
"#;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        match manager.get_database_backend() {
            DatabaseBackend::Postgres => {
                conn.execute_unprepared(PG_FUNCTION).await?;
                conn.execute_unprepared(&format!(
                    "DROP TRIGGER IF EXISTS {} ON msgs",
                    TRIGGER_NAME
                ))
                .await?;
                conn.execute_unprepared(PG_TRIGGER).await?;
            }
            DatabaseBackend::MySql => {
                conn.execute_unprepared(&format!("DROP TRIGGER IF EXISTS {}", TRIGGER_NAME))
                    .await?;
                conn.execute_unprepared(MYSQL_TRIGGER).await?;
            }
            DatabaseBackend::Sqlite => {
                conn.execute_unprepared(SQLITE_TRIGGER).await?;
            }
            #[allow(unreachable_patterns)]
            _ => {
                return Err(DbErr::Migration(
                    "broadcast status trigger: unsupported database backend".to_string(),
                ));
            }
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        match manager.get_database_backend() {
            DatabaseBackend::Postgres => {
                conn.execute_unprepared(&format!(
                    "DROP TRIGGER IF EXISTS {} ON msgs",
                    TRIGGER_NAME
                ))
                .await?;
                conn.execute_unprepared(&format!(
                    "DROP FUNCTION IF EXISTS {}()",
                    PG_FUNCTION_NAME
                ))
                .await?;
            }
            _ => {
                conn.execute_unprepared(&format!("DROP TRIGGER IF EXISTS {}", TRIGGER_NAME))
                    .await?;
            }
        }

        Ok(())
    }
}
