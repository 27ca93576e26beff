//! アダプター（外界の I/O を trait で抽象化）
//!
//! domain / usecase はこのモジュールの実装を ports の trait 経由でのみ使う。
//! 実装は標準実装（Std*）やテスト用のモックを注入する。

pub mod composite_log;
pub mod file_json_log;
pub mod human_log;
pub mod memory_log;
pub mod std_env_resolver;
pub mod std_fs;

pub use composite_log::CompositeLog;
pub use file_json_log::{FileJsonLog, NoopLog};
pub use human_log::HumanLog;
pub use memory_log::MemoryLog;
pub use std_env_resolver::StdEnvResolver;
pub use std_fs::StdFileSystem;
