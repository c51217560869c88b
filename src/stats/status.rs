//! 消息状态与群发计数增量
//!
//! `CounterDelta::for_transition` 与数据库中的状态触发器使用同一张转换表，
//! 状态写入路径用它报告每次写入产生的计数效果。

use std::fmt;
use std::str::FromStr;

use strum::{EnumIter, IntoStaticStr};

use crate::errors::MsgstatsError;

/// 消息状态（单字符编码）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum MsgStatus {
    #[strum(serialize = "I")]
    Initializing,
    #[strum(serialize = "P")]
    Pending,
    #[strum(serialize = "Q")]
    Queued,
    /// Accepted by the provider
    #[strum(serialize = "W")]
    Wired,
    #[strum(serialize = "S")]
    Sent,
    #[strum(serialize = "D")]
    Delivered,
    #[strum(serialize = "H")]
    Handled,
    #[strum(serialize = "E")]
    Errored,
    #[strum(serialize = "F")]
    Failed,
    #[strum(serialize = "R")]
    Resent,
    #[strum(serialize = "V")]
    Read,
}

impl MsgStatus {
    /// Database code of this status
    pub fn code(self) -> &'static str {
        self.into()
    }

    pub fn from_code(code: &str) -> Result<Self, MsgstatsError> {
        match code {
            "I" => Ok(Self::Initializing),
            "P" => Ok(Self::Pending),
            "Q" => Ok(Self::Queued),
            "W" => Ok(Self::Wired),
            "S" => Ok(Self::Sent),
            "D" => Ok(Self::Delivered),
            "H" => Ok(Self::Handled),
            "E" => Ok(Self::Errored),
            "F" => Ok(Self::Failed),
            "R" => Ok(Self::Resent),
            "V" => Ok(Self::Read),
            other => Err(MsgstatsError::validation(format!(
                "Invalid message status: '{}'. Valid: I, P, Q, W, S, D, H, E, F, R, V",
                other
            ))),
        }
    }
}

impl fmt::Display for MsgStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for MsgStatus {
    type Err = MsgstatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s.trim().to_uppercase().as_str())
    }
}

/// 消息方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    pub fn code(self) -> &'static str {
        match self {
            Direction::Inbound => "I",
            Direction::Outbound => "O",
        }
    }
}

/// 一次状态写入对群发统计行产生的增量
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CounterDelta {
    pub sent: i64,
    pub delivered: i64,
    pub failed: i64,
    pub read: i64,
    pub processed: i64,
    pub cost: f64,
    /// Whether the statistics row's `modified_on` is refreshed
    pub touches_modified_on: bool,
}

impl CounterDelta {
    /// 状态从 `previous` 变为 `current` 时的计数效果
    ///
    /// 状态未变化时没有效果。
    pub fn for_transition(
        previous: MsgStatus,
        current: MsgStatus,
        template_price: Option<f64>,
    ) -> Self {
        let mut delta = Self::default();
        if previous == current {
            return delta;
        }

        match current {
            MsgStatus::Sent => {
                delta.sent = 1;
                delta.cost = template_price.unwrap_or(0.0);
            }
            MsgStatus::Delivered => delta.delivered = 1,
            MsgStatus::Failed => {
                delta.failed = 1;
                // 直接从队列失败也算已处理
                if previous == MsgStatus::Queued {
                    delta.processed = 1;
                }
            }
            MsgStatus::Wired => {
                delta.processed = 1;
                delta.touches_modified_on = true;
            }
            MsgStatus::Read => delta.read = 1,
            _ => {}
        }

        delta
    }

    pub fn is_empty(&self) -> bool {
        self.sent == 0
            && self.delivered == 0
            && self.failed == 0
            && self.read == 0
            && self.processed == 0
            && self.cost == 0.0
            && !self.touches_modified_on
    }

    pub fn merge(&mut self, other: &CounterDelta) {
        self.sent += other.sent;
        self.delivered += other.delivered;
        self.failed += other.failed;
        self.read += other.read;
        self.processed += other.processed;
        self.cost += other.cost;
        self.touches_modified_on |= other.touches_modified_on;
    }
}

impl fmt::Display for CounterDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sent +{}, delivered +{}, failed +{}, read +{}, processed +{}, cost +{:.4}",
            self.sent, self.delivered, self.failed, self.read, self.processed, self.cost
        )
    }
}
