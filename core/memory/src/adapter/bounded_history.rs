//! メモリ上の上限付き履歴（FIFO で古いメッセージを捨てる）

use crate::ports::outbound::HistoryStore;
use common::config::DEFAULT_MAX_MESSAGES;
use common::error::Error;
use common::msg::Message;
use serde::{Deserialize, Serialize};

/// スナップショットの JSON 形式
#[derive(Debug, Serialize, Deserialize)]
struct HistorySnapshot {
    max_messages: usize,
    messages: Vec<Message>,
}

/// 上限付きのメッセージ列
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedHistory {
    messages: Vec<Message>,
    max_messages: usize,
}

impl BoundedHistory {
    pub fn new(max_messages: usize) -> Result<Self, Error> {
        if max_messages == 0 {
            return Err(Error::invalid_argument("max_messages must be greater than 0"));
        }
        Ok(Self {
            messages: Vec::new(),
            max_messages,
        })
    }

    /// 既存のメッセージ列から作る。上限を超える分は古い側を捨てる。
    pub fn from_messages(messages: Vec<Message>, max_messages: usize) -> Result<Self, Error> {
        let mut history = Self::new(max_messages)?;
        history.messages = messages;
        history.evict_overflow();
        Ok(history)
    }

    pub fn from_snapshot_json(json: &str) -> Result<Self, Error> {
        let snapshot: HistorySnapshot = serde_json::from_str(json)?;
        Self::from_messages(snapshot.messages, snapshot.max_messages)
    }

    pub fn to_snapshot_json(&self) -> Result<String, Error> {
        let snapshot = HistorySnapshot {
            max_messages: self.max_messages,
            messages: self.messages.clone(),
        };
        Ok(serde_json::to_string(&snapshot)?)
    }

    /// 末尾 n 件（n が件数以上なら全件）
    pub fn recent(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    fn evict_overflow(&mut self) {
        if self.messages.len() > self.max_messages {
            let excess = self.messages.len() - self.max_messages;
            self.messages.drain(..excess);
        }
    }
}

impl Default for BoundedHistory {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            max_messages: DEFAULT_MAX_MESSAGES,
        }
    }
}

impl HistoryStore for BoundedHistory {
    fn append(&mut self, message: Message) -> Result<(), Error> {
        self.messages.push(message);
        self.evict_overflow();
        Ok(())
    }

    fn messages(&self) -> &[Message] {
        &self.messages
    }

    fn max_messages(&self) -> usize {
        self.max_messages
    }
}
