//! Outbound ポート: アプリが外界（FS・環境変数・ログ）を使うための trait

pub mod env_resolver;
pub mod fs;
pub mod log;

pub use env_resolver::{EnvResolver, CONFIG_ENV_VAR};
pub use fs::{FileMetadata, FileSystem};
pub use log::{now_iso8601, Log, LogLevel, LogRecord};
