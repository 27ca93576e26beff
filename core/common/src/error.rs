//! エラーハンドリング
//!
//! 全 crate で共有するエラー型。CLI では `exit_code()` で終了コードに変換する。

/// エラー型
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// ファイル I/O の失敗
    #[error("{0}")]
    Io(String),
    /// 引数・設定値の不正
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// JSON のパース・シリアライズ失敗
    #[error("JSON error: {0}")]
    Json(String),
    /// 環境変数まわりの失敗（AGENT_MEMORY_CONFIG が存在しないファイルを指す等）
    #[error("Environment error: {0}")]
    Env(String),
    /// 履歴ストア固有の失敗
    #[error("Store error: {0}")]
    Store(String),
}

impl Error {
    pub fn io_msg(msg: impl Into<String>) -> Self {
        Error::Io(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub fn json(msg: impl Into<String>) -> Self {
        Error::Json(msg.into())
    }

    pub fn env(msg: impl Into<String>) -> Self {
        Error::Env(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Error::Store(msg.into())
    }

    /// 終了コード（sysexits.h 準拠）
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidArgument(_) => 64,
            Error::Json(_) => 65,
            Error::Store(_) => 70,
            Error::Io(_) => 74,
            Error::Env(_) => 78,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e.to_string())
    }
}
