//! Ports & Adapters のポート定義
//!
//! - outbound: ValidatedHistory が委譲する履歴ストアの trait

pub mod outbound;
