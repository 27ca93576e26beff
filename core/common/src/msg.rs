//! 会話メッセージ（system / user / assistant / tool と tool_calls 対応）
//!
//! 履歴ストアは Vec<Message> を保持し、LLM へのリクエスト組み立て時にそのまま渡す。
//! JSONL では 1 行 1 メッセージとして保存する。

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// メッセージの役割（追加後は変わらない）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ツール呼び出し1件（assistant が model から受け取った要求）
///
/// 読み込みは平坦な `{"id","name","args"}` と chat-completion 形式の
/// `{"id","type":"function","function":{"name","arguments"}}` の両方を受け付ける。
/// 書き出しは平坦な形式。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ToolCallWire")]
pub struct ToolCallSpec {
    pub id: String,
    pub name: String,
    pub args: Value,
}

#[derive(Deserialize)]
struct ToolCallWire {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    args: Option<Value>,
    #[serde(default)]
    function: Option<FunctionWire>,
}

#[derive(Deserialize)]
struct FunctionWire {
    #[serde(default)]
    name: Option<String>,
    /// chat-completion では JSON 文字列のまま届く
    #[serde(default)]
    arguments: Option<Value>,
}

impl From<ToolCallWire> for ToolCallSpec {
    fn from(w: ToolCallWire) -> Self {
        let (fn_name, fn_args) = match w.function {
            Some(f) => (f.name, f.arguments),
            None => (None, None),
        };
        ToolCallSpec {
            id: w.id,
            name: fn_name.or(w.name).unwrap_or_default(),
            args: fn_args.or(w.args).unwrap_or(Value::Null),
        }
    }
}

/// `"content": null` を空文字として読む
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// メッセージ構造体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    /// ツール呼び出しのみの assistant では空文字（null も空文字として読む）
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    /// assistant がツールを呼んだ場合
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallSpec>>,
    /// role が "tool" のとき、どの call_id への返答か
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// ツール呼び出し付き assistant（content は空でも可）
    pub fn assistant_with_tool_calls(
        content: impl Into<String>,
        tool_calls: Vec<(String, String, Value)>,
    ) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: Some(
                tool_calls
                    .into_iter()
                    .map(|(id, name, args)| ToolCallSpec { id, name, args })
                    .collect(),
            ),
            tool_call_id: None,
        }
    }

    /// ツール結果（role = "tool"）
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_calls: None,
            tool_call_id: Some(call_id.into()),
        }
    }

    /// 空文字の tool_call_id は未設定として扱う
    pub fn tool_call_id(&self) -> Option<&str> {
        self.tool_call_id.as_deref().filter(|id| !id.is_empty())
    }

    /// assistant の tool_calls（無ければ空スライス）
    pub fn tool_calls(&self) -> &[ToolCallSpec] {
        match (&self.role, &self.tool_calls) {
            (Role::Assistant, Some(calls)) => calls.as_slice(),
            _ => &[],
        }
    }

    /// この assistant メッセージが `id` のツール呼び出しを宣言しているか
    pub fn declares_tool_call(&self, id: &str) -> bool {
        self.tool_calls().iter().any(|call| call.id == id)
    }
}
