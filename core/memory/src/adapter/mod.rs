//! 履歴ストアの具象実装（メモリ上の上限付き履歴 / JSONL 永続化）

pub mod bounded_history;
pub mod jsonl_history_store;

pub use bounded_history::BoundedHistory;
pub use jsonl_history_store::JsonlHistoryStore;
