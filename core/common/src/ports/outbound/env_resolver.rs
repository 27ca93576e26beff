//! 環境変数解決 Outbound ポート
//!
//! 設定ファイルの場所と `${VAR}` 展開に使う値を環境変数から解決する。
//! 設定読み込みはこの trait 経由でのみ環境変数にアクセスする。

use std::path::PathBuf;

/// 設定ファイルのパスを指定する環境変数
pub const CONFIG_ENV_VAR: &str = "AGENT_MEMORY_CONFIG";

/// 環境変数解決抽象（Outbound ポート）
///
/// 実装は `common::adapter::StdEnvResolver` やテスト用のモックなど。
pub trait EnvResolver: Send + Sync {
    /// 環境変数の値（未設定なら None）
    fn var(&self, name: &str) -> Option<String>;

    /// 設定ファイルのパスを環境変数 AGENT_MEMORY_CONFIG から取得（空文字は未設定扱い）
    fn config_path_from_env(&self) -> Option<PathBuf> {
        self.var(CONFIG_ENV_VAR)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    }
}
