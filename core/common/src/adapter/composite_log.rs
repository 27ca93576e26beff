//! 複数の Log へ順に書き出すコンポジット

use crate::error::Error;
use crate::ports::outbound::{Log, LogRecord};
use std::sync::Arc;

/// 登録された Log すべてに順に書き出す（途中で失敗しても残りに書き、最初のエラーを返す）
pub struct CompositeLog {
    sinks: Vec<Arc<dyn Log>>,
}

impl CompositeLog {
    pub fn new(sinks: Vec<Arc<dyn Log>>) -> Self {
        Self { sinks }
    }
}

impl Log for CompositeLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        let mut first_err = None;
        for sink in &self.sinks {
            if let Err(e) = sink.log(record) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
