//! 人間向けログ（LogRecord → stderr 等への要点のみ出力）
//!
//! fields の全量は出さず要点のみ（巨大化防止）。

use crate::error::Error;
use crate::ports::outbound::{Log, LogLevel, LogRecord};
use std::io::Write;
use std::sync::Mutex;

const FIELDS_SUMMARY_MAX: usize = 400;

/// fields の要点だけを短い文字列にする
fn fields_summary(record: &LogRecord) -> Option<String> {
    let fields = record.fields.as_ref().filter(|f| !f.is_empty())?;
    let s = fields
        .iter()
        .map(|(k, v)| match v.as_str() {
            Some(s) => format!("{}={}", k, s),
            None => format!("{}={}", k, v),
        })
        .collect::<Vec<_>>()
        .join(" ");
    if s.chars().count() <= FIELDS_SUMMARY_MAX {
        return Some(s);
    }
    let truncated = s.chars().take(FIELDS_SUMMARY_MAX).collect::<String>();
    Some(format!("{}... (len={})", truncated, s.len()))
}

/// 1 レコードを 1 行に整形する
pub fn format_line(record: &LogRecord) -> String {
    let mut line = format!("[{}]", record.level);
    if let Some(layer) = &record.layer {
        line.push_str(&format!(" {}:", layer));
    }
    line.push(' ');
    line.push_str(&record.message);
    if let Some(summary) = fields_summary(record) {
        line.push_str(" (");
        line.push_str(&summary);
        line.push(')');
    }
    line
}

/// 人間向けログ（既定は stderr、max_level より詳細なレコードは捨てる）
pub struct HumanLog {
    out: Mutex<Box<dyn Write + Send>>,
    max_level: LogLevel,
}

impl HumanLog {
    pub fn new(out: Box<dyn Write + Send>, max_level: LogLevel) -> Self {
        Self {
            out: Mutex::new(out),
            max_level,
        }
    }

    pub fn stderr(max_level: LogLevel) -> Self {
        Self::new(Box::new(std::io::stderr()), max_level)
    }
}

impl Log for HumanLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        if record.level > self.max_level {
            return Ok(());
        }
        let mut out = self
            .out
            .lock()
            .map_err(|_| Error::io_msg("human log writer lock poisoned"))?;
        writeln!(out, "{}", format_line(record)).map_err(|e| Error::io_msg(e.to_string()))?;
        out.flush().map_err(|e| Error::io_msg(e.to_string()))
    }
}
