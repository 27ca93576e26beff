//! ツール呼び出しエージェントの会話メモリ
//!
//! 上限付きの履歴ストアと、その追記を tool / assistant の対応検査で包む
//! `ValidatedHistory` を提供します。検査は助言的で、メッセージを拒否しません。

pub mod adapter;
pub mod domain;
pub mod ports;

pub use adapter::{BoundedHistory, JsonlHistoryStore};
pub use domain::{ToolCallCheck, ValidatedHistory};
pub use ports::outbound::HistoryStore;

#[cfg(test)]
mod tests;
