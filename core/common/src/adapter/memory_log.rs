//! メモリ上にレコードを溜める Log 実装（テストでの検証・警告件数の集計用）

use crate::error::Error;
use crate::ports::outbound::{Log, LogLevel, LogRecord};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryLog {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 記録済みレコードのコピー（記録順）
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// 指定レベルのレコード数
    pub fn count(&self, level: LogLevel) -> usize {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|r| r.level == level)
            .count()
    }

    pub fn warnings(&self) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.level == LogLevel::Warn)
            .collect()
    }
}

impl Log for MemoryLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        self.records
            .lock()
            .map_err(|_| Error::io_msg("memory log lock poisoned"))?
            .push(record.clone());
        Ok(())
    }
}
