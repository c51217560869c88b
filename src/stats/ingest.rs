//! 消息状态批量应用
//!
//! 每行一个 JSON 对象：`{"msg_id": 42, "status": "S"}`。
//! 单行出错只计数，不中断整个流。

use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use super::status::{CounterDelta, MsgStatus};
use super::MessageStore;
use crate::errors::{MsgstatsError, Result};

#[derive(Debug, Deserialize)]
struct StatusLine {
    msg_id: i64,
    status: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestSummary {
    /// Non-blank lines read
    pub lines: u64,
    /// Writes that changed broadcast statistics
    pub applied: u64,
    /// Writes with no counter effect
    pub unchanged: u64,
    pub errors: u64,
    pub delta: CounterDelta,
}

fn parse_line(line: &str) -> Result<(i64, MsgStatus)> {
    let parsed: StatusLine = serde_json::from_str(line)?;
    let status = MsgStatus::from_code(parsed.status.trim())?;
    Ok((parsed.msg_id, status))
}

pub async fn apply_status_lines<R>(store: &dyn MessageStore, mut reader: R) -> Result<IngestSummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut summary = IngestSummary::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        // 按字节读取，非 UTF-8 行只算一条错误
        let line = match std::str::from_utf8(&buf) {
            Ok(text) => text.trim(),
            Err(e) => {
                summary.lines += 1;
                summary.errors += 1;
                warn!(line = summary.lines, "Skipping non UTF-8 status line: {}", e);
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }
        summary.lines += 1;

        let (msg_id, status) = match parse_line(line) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(line = summary.lines, "Skipping status line: {}", e);
                summary.errors += 1;
                continue;
            }
        };

        match store.update_status(msg_id, status).await {
            Ok(update) => match update.delta {
                Some(delta) if !delta.is_empty() => {
                    debug!(msg_id, from = %update.previous, to = %update.current, "Counters updated");
                    summary.applied += 1;
                    summary.delta.merge(&delta);
                }
                _ => summary.unchanged += 1,
            },
            Err(e) => {
                match e {
                    MsgstatsError::NotFound(_) => warn!(msg_id, "Unknown message"),
                    _ => warn!(msg_id, "Status update failed: {}", e),
                }
                summary.errors += 1;
            }
        }
    }

    Ok(summary)
}
