//! 会話ログを ValidatedHistory に流し込み、警告を集計する

use crate::args::Config;
use common::adapter::{CompositeLog, FileJsonLog, MemoryLog};
use common::config::MemoryConfig;
use common::error::Error;
use common::msg::Message;
use common::ports::outbound::{EnvResolver, FileSystem, Log, LogLevel, LogRecord};
use memory::{HistoryStore, JsonlHistoryStore, ValidatedHistory};
use std::path::Path;
use std::sync::Arc;

/// 1 回の検査結果
#[derive(Debug, Clone, PartialEq)]
pub struct LintReport {
    /// 会話ログから読んだメッセージ数
    pub read: usize,
    /// 永続履歴から復元したメッセージ数（--store 未指定なら 0）
    pub restored: usize,
    /// 上限適用後に履歴に残ったメッセージ数
    pub kept: usize,
    pub max_messages: usize,
    pub warnings: usize,
    /// 残った履歴の中で未応答の tool_call id
    pub pending_tool_calls: Vec<String>,
}

impl LintReport {
    pub fn exit_code(&self, strict: bool) -> i32 {
        if strict && self.warnings > 0 {
            1
        } else {
            0
        }
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!("messages read: {}", self.read)];
        if self.restored > 0 {
            lines.push(format!("messages restored: {}", self.restored));
        }
        lines.extend([
            format!("messages kept: {} (max {})", self.kept, self.max_messages),
            format!("warnings: {}", self.warnings),
        ]);
        if self.pending_tool_calls.is_empty() {
            lines.push("pending tool calls: none".to_string());
        } else {
            lines.push(format!(
                "pending tool calls: {}",
                self.pending_tool_calls.join(", ")
            ));
        }
        lines.join("\n")
    }
}

/// JSONL の会話ログを読む（空行は無視、壊れた行は行番号つきでエラー）
pub fn read_transcript(fs: &dyn FileSystem, path: &Path) -> Result<Vec<Message>, Error> {
    let body = fs.read_to_string(path)?;
    let mut messages = Vec::new();
    for (i, line) in body.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let message: Message = serde_json::from_str(line)
            .map_err(|e| Error::json(format!("{}:{}: {}", path.display(), i + 1, e)))?;
        messages.push(message);
    }
    Ok(messages)
}

/// 設定を解決して会話ログを検査する。`console` には人間向けの出力先を渡す。
pub fn run(
    config: &Config,
    fs: Arc<dyn FileSystem>,
    env: &dyn EnvResolver,
    console: Arc<dyn Log>,
) -> Result<LintReport, Error> {
    let mut memory_config = MemoryConfig::resolve(fs.as_ref(), config.config_path.as_deref(), env)?;
    if let Some(n) = config.max_messages {
        memory_config.max_messages = n;
    }
    if config.log_file.is_some() {
        memory_config.log_path = config.log_file.clone();
    }
    if config.store_path.is_some() {
        memory_config.store_path = config.store_path.clone();
    }

    // ファイルを先に置き、console の失敗で JSONL ログが欠けないようにする
    let collected = Arc::new(MemoryLog::new());
    let mut sinks: Vec<Arc<dyn Log>> = vec![collected.clone()];
    if let Some(path) = &memory_config.log_path {
        sinks.push(Arc::new(FileJsonLog::new(Arc::clone(&fs), path)));
    }
    sinks.push(console);
    let log: Arc<dyn Log> = Arc::new(CompositeLog::new(sinks));

    let messages = read_transcript(fs.as_ref(), &config.transcript)?;
    let read = messages.len();
    let _ = log.log(
        &LogRecord::new(LogLevel::Info, "replaying transcript")
            .with_layer("cli")
            .with_kind("lifecycle")
            .with_field("path", serde_json::json!(config.transcript.display().to_string()))
            .with_field("messages", serde_json::json!(read))
            .with_field("max_messages", serde_json::json!(memory_config.max_messages)),
    );

    let (restored, history) = match &memory_config.store_path {
        Some(path) => {
            let store =
                JsonlHistoryStore::open(Arc::clone(&fs), path, memory_config.max_messages)?;
            let restored = store.len();
            let history = ValidatedHistory::from_existing(store, Arc::clone(&log));
            (restored, replay(history, messages)?)
        }
        None => {
            let history =
                ValidatedHistory::with_capacity(memory_config.max_messages, Arc::clone(&log))?;
            (0, replay(history, messages)?)
        }
    };

    Ok(LintReport {
        read,
        restored,
        kept: history.kept,
        max_messages: history.max_messages,
        warnings: collected.count(LogLevel::Warn),
        pending_tool_calls: history.pending_tool_calls,
    })
}

/// 流し込み後の履歴の要約
struct Replayed {
    kept: usize,
    max_messages: usize,
    pending_tool_calls: Vec<String>,
}

fn replay<S: HistoryStore>(
    mut history: ValidatedHistory<S>,
    messages: Vec<Message>,
) -> Result<Replayed, Error> {
    history.append_many(messages)?;
    Ok(Replayed {
        kept: history.len(),
        max_messages: history.max_messages(),
        pending_tool_calls: history
            .pending_tool_call_ids()
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}
