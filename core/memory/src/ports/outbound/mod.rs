//! Outbound ポート: 検証層が外部の履歴ストアを使うための trait

pub mod history_store;

pub use history_store::HistoryStore;
