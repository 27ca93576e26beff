//! 会話メモリ共通ライブラリ
//!
//! `memory` crate と `memlint` で共有する型・ポート・アダプタを提供します。

/// エラーハンドリング
pub mod error;

/// 会話メッセージ
pub mod msg;

/// Ports & Adapters（ログ・FS・環境変数）
pub mod ports;
pub mod adapter;

/// 設定の読み込み（`${ENV_VAR}` 展開つき）
pub mod config;
