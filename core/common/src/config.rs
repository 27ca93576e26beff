//! 会話メモリの設定（memory.json）
//!
//! JSON を読み込み、文字列値に含まれる `${ENV_VAR}` を環境変数で置換してから型に変換する。
//! 未設定の環境変数は置換せずそのまま残す。

use crate::error::Error;
use crate::ports::outbound::{EnvResolver, FileSystem, CONFIG_ENV_VAR};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// 履歴の既定上限（メッセージ数）
pub const DEFAULT_MAX_MESSAGES: usize = 100;

fn env_var_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([A-Za-z0-9_]+)\}").expect("valid env var pattern"))
}

/// 文字列中の `${NAME}` を環境変数の値で置換する（未設定ならそのまま）
pub fn interpolate_str(s: &str, env: &dyn EnvResolver) -> String {
    env_var_pattern()
        .replace_all(s, |caps: &regex::Captures<'_>| {
            env.var(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// JSON 値を再帰的にたどり、文字列に対して `interpolate_str` を適用する
pub fn interpolate_env(value: Value, env: &dyn EnvResolver) -> Value {
    match value {
        Value::String(s) => Value::String(interpolate_str(&s, env)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|v| interpolate_env(v, env))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, interpolate_env(v, env)))
                .collect(),
        ),
        other => other,
    }
}

/// memory.json のルート
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryConfig {
    /// 履歴に保持する最大メッセージ数（超えたら古い順に捨てる）
    pub max_messages: usize,
    /// 履歴を JSONL で永続化する場合のパス
    pub store_path: Option<PathBuf>,
    /// 構造化ログ（JSONL）の出力先
    pub log_path: Option<PathBuf>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_messages: DEFAULT_MAX_MESSAGES,
            store_path: None,
            log_path: None,
        }
    }
}

/// serde 用の内部構造（max_messages は `"${MAX}"` のような文字列も許す）
#[derive(Debug, Deserialize)]
struct MemoryConfigRaw {
    max_messages: Option<Value>,
    store_path: Option<String>,
    log_path: Option<String>,
}

fn parse_max_messages(v: &Value) -> Result<usize, Error> {
    let n = match v {
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    }
    .ok_or_else(|| {
        Error::invalid_argument(format!("max_messages must be a positive integer, got {}", v))
    })?;
    if n == 0 {
        return Err(Error::invalid_argument("max_messages must be greater than 0"));
    }
    Ok(n)
}

impl MemoryConfig {
    /// JSON 文字列からパース（ファイル読みは `load` で行う）
    pub fn parse(json: &str, env: &dyn EnvResolver) -> Result<Self, Error> {
        let value: Value = serde_json::from_str(json)?;
        let raw: MemoryConfigRaw = serde_json::from_value(interpolate_env(value, env))?;
        let max_messages = match &raw.max_messages {
            Some(v) => parse_max_messages(v)?,
            None => DEFAULT_MAX_MESSAGES,
        };
        Ok(MemoryConfig {
            max_messages,
            store_path: raw.store_path.filter(|s| !s.is_empty()).map(PathBuf::from),
            log_path: raw.log_path.filter(|s| !s.is_empty()).map(PathBuf::from),
        })
    }

    pub fn load(fs: &dyn FileSystem, path: &Path, env: &dyn EnvResolver) -> Result<Self, Error> {
        let body = fs.read_to_string(path)?;
        Self::parse(&body, env).map_err(|e| match e {
            Error::Json(msg) => Error::json(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// 明示パス → AGENT_MEMORY_CONFIG → 既定値 の順で解決する
    ///
    /// AGENT_MEMORY_CONFIG が存在しないファイルを指していれば `Error::Env`。
    pub fn resolve(
        fs: &dyn FileSystem,
        explicit: Option<&Path>,
        env: &dyn EnvResolver,
    ) -> Result<Self, Error> {
        if let Some(path) = explicit {
            return Self::load(fs, path, env);
        }
        match env.config_path_from_env() {
            Some(path) if !fs.exists(&path) => Err(Error::env(format!(
                "{} points to a missing file: {}",
                CONFIG_ENV_VAR,
                path.display()
            ))),
            Some(path) => Self::load(fs, &path, env),
            None => Ok(Self::default()),
        }
    }
}
