//! 検証付き履歴
//!
//! 履歴ストアを包み、追記のたびに tool メッセージと assistant の tool_call の対応を検査する。
//! 検査結果は注入された Log へ警告として出すだけで、メッセージは常にストアへ渡す。
//! ストア自身のエラーはそのまま呼び出し元へ返す。

use super::tool_call_check::{check_tool_message, pending_tool_call_ids, ToolCallCheck};
use crate::adapter::BoundedHistory;
use crate::ports::outbound::HistoryStore;
use common::error::Error;
use common::msg::Message;
use common::ports::outbound::Log;
use std::sync::Arc;

/// 検証付き履歴（単一の書き手を前提とし、内部でロックは取らない）
pub struct ValidatedHistory<S: HistoryStore = BoundedHistory> {
    store: S,
    log: Arc<dyn Log>,
}

impl ValidatedHistory<BoundedHistory> {
    /// 既定上限の空の履歴
    pub fn new(log: Arc<dyn Log>) -> Self {
        Self::from_existing(BoundedHistory::default(), log)
    }

    pub fn with_capacity(max_messages: usize, log: Arc<dyn Log>) -> Result<Self, Error> {
        Ok(Self::from_existing(BoundedHistory::new(max_messages)?, log))
    }
}

impl<S: HistoryStore> ValidatedHistory<S> {
    /// 既存のストアを包む。既にあるメッセージは検査しない。
    pub fn from_existing(store: S, log: Arc<dyn Log>) -> Self {
        Self { store, log }
    }

    /// 現在の履歴に対する検査結果（ログは出さない）
    pub fn check(&self, message: &Message) -> ToolCallCheck {
        check_tool_message(self.store.messages(), message)
    }

    /// 検査してからストアへ追記する。検査結果に関わらず追記する。
    pub fn append(&mut self, message: Message) -> Result<(), Error> {
        let check = self.check(&message);
        if let Some(record) = check.to_log_record(&message) {
            let _ = self.log.log(&record);
        }
        self.store.append(message)
    }

    /// 1 件ずつ順に `append` する。途中でストアが失敗したら、それまでの追記は残したまま返す。
    pub fn append_many<I>(&mut self, messages: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = Message>,
    {
        for message in messages {
            self.append(message)?;
        }
        Ok(())
    }

    /// LLM へのリクエスト組み立て用の現在のメッセージ列（古い順）
    pub fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    pub fn max_messages(&self) -> usize {
        self.store.max_messages()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// まだ tool メッセージで応答されていない tool_call の id
    pub fn pending_tool_call_ids(&self) -> Vec<&str> {
        pending_tool_call_ids(self.store.messages())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}
