//! tool メッセージと assistant の tool_calls の対応検査（純粋関数）
//!
//! chat-completion API は、role "tool" のメッセージより前に同じ id の tool_call を
//! 宣言した assistant メッセージがあることを要求する。ここではその対応を調べるだけで、
//! メッセージを拒否・削除はしない。

use common::msg::{Message, Role};
use common::ports::outbound::{LogLevel, LogRecord};

const LOG_LAYER: &str = "memory";
const LOG_KIND: &str = "tool_call";

/// 1 件の tool メッセージに対する検査結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCallCheck {
    /// tool 以外の role（検査対象外）
    NotApplicable,
    /// 対応する assistant の tool_call が見つかった
    Matched,
    /// tool メッセージに tool_call_id が無い
    MissingId,
    /// どの assistant の tool_calls にも tool_call_id が無い
    Unmatched { tool_call_id: String },
}

impl ToolCallCheck {
    pub fn is_warning(&self) -> bool {
        matches!(self, ToolCallCheck::MissingId | ToolCallCheck::Unmatched { .. })
    }

    /// 警告に当たる結果なら warn レベルのログレコードを作る
    pub fn to_log_record(&self, message: &Message) -> Option<LogRecord> {
        match self {
            ToolCallCheck::NotApplicable | ToolCallCheck::Matched => None,
            ToolCallCheck::MissingId => Some(
                LogRecord::new(
                    LogLevel::Warn,
                    "tool message has no tool_call_id; it cannot be paired with an assistant tool_call",
                )
                .with_layer(LOG_LAYER)
                .with_kind(LOG_KIND)
                .with_field("check", serde_json::json!("missing_id"))
                .with_field("content_chars", serde_json::json!(message.content.chars().count())),
            ),
            ToolCallCheck::Unmatched { tool_call_id } => Some(
                LogRecord::new(
                    LogLevel::Warn,
                    format!(
                        "tool message {} has no matching tool_call in any earlier assistant message; \
                         chat-completion APIs require a 'tool' message to follow a message with 'tool_calls'",
                        tool_call_id
                    ),
                )
                .with_layer(LOG_LAYER)
                .with_kind(LOG_KIND)
                .with_field("check", serde_json::json!("unmatched"))
                .with_field("tool_call_id", serde_json::json!(tool_call_id)),
            ),
        }
    }
}

/// tool_call_id を宣言した assistant メッセージの位置を、新しい方から探す
pub fn find_declaring_assistant(history: &[Message], tool_call_id: &str) -> Option<usize> {
    history
        .iter()
        .rposition(|m| m.role == Role::Assistant && m.declares_tool_call(tool_call_id))
}

/// `message` を `history` の末尾に追加するとしたときの検査結果
pub fn check_tool_message(history: &[Message], message: &Message) -> ToolCallCheck {
    if message.role != Role::Tool {
        return ToolCallCheck::NotApplicable;
    }
    let Some(tool_call_id) = message.tool_call_id() else {
        return ToolCallCheck::MissingId;
    };
    match find_declaring_assistant(history, tool_call_id) {
        Some(_) => ToolCallCheck::Matched,
        None => ToolCallCheck::Unmatched {
            tool_call_id: tool_call_id.to_string(),
        },
    }
}

/// 宣言済みだが、その後の tool メッセージでまだ応答されていない tool_call の id（宣言順）
pub fn pending_tool_call_ids(history: &[Message]) -> Vec<&str> {
    let mut pending: Vec<&str> = Vec::new();
    for m in history {
        match m.role {
            Role::Assistant => {
                for call in m.tool_calls() {
                    if !pending.contains(&call.id.as_str()) {
                        pending.push(call.id.as_str());
                    }
                }
            }
            Role::Tool => {
                if let Some(id) = m.tool_call_id() {
                    pending.retain(|p| *p != id);
                }
            }
            _ => {}
        }
    }
    pending
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(id: &str) -> (String, String, serde_json::Value) {
        (id.to_string(), "run_shell".to_string(), json!({}))
    }

    #[test]
    fn test_non_tool_roles_are_not_checked() {
        let history: Vec<Message> = Vec::new();
        for m in [
            Message::system("s"),
            Message::user("u"),
            Message::assistant("a"),
        ] {
            assert_eq!(check_tool_message(&history, &m), ToolCallCheck::NotApplicable);
        }
    }

    #[test]
    fn test_matched_anywhere_in_history() {
        let history = vec![
            Message::user("q"),
            Message::assistant_with_tool_calls("", vec![call("c1"), call("c2")]),
            Message::tool_result("c2", "second first"),
            Message::user("interleaved"),
            Message::assistant("thinking"),
        ];
        assert_eq!(
            check_tool_message(&history, &Message::tool_result("c1", "ok")),
            ToolCallCheck::Matched
        );
    }

    #[test]
    fn test_unmatched_with_empty_history() {
        assert_eq!(
            check_tool_message(&[], &Message::tool_result("c1", "ok")),
            ToolCallCheck::Unmatched {
                tool_call_id: "c1".to_string()
            }
        );
    }

    #[test]
    fn test_tool_calls_on_user_do_not_count() {
        let mut fake = Message::user("u");
        fake.tool_calls = Some(vec![common::msg::ToolCallSpec {
            id: "c1".to_string(),
            name: "x".to_string(),
            args: json!(null),
        }]);
        let check = check_tool_message(&[fake], &Message::tool_result("c1", "ok"));
        assert!(matches!(check, ToolCallCheck::Unmatched { .. }));
    }

    #[test]
    fn test_missing_and_empty_id() {
        let no_id = Message::new(Role::Tool, "out");
        assert_eq!(check_tool_message(&[], &no_id), ToolCallCheck::MissingId);
        let empty_id = Message::tool_result("", "out");
        assert_eq!(check_tool_message(&[], &empty_id), ToolCallCheck::MissingId);
    }

    #[test]
    fn test_find_declaring_assistant_returns_newest() {
        let history = vec![
            Message::assistant_with_tool_calls("", vec![call("dup")]),
            Message::user("u"),
            Message::assistant_with_tool_calls("", vec![call("dup")]),
        ];
        assert_eq!(find_declaring_assistant(&history, "dup"), Some(2));
        assert_eq!(find_declaring_assistant(&history, "other"), None);
    }

    #[test]
    fn test_log_record_for_warnings() {
        let m = Message::tool_result("A2", "x");
        let unmatched = ToolCallCheck::Unmatched {
            tool_call_id: "A2".to_string(),
        };
        let rec = unmatched.to_log_record(&m).unwrap();
        assert_eq!(rec.level, LogLevel::Warn);
        assert_eq!(rec.field_str("tool_call_id"), Some("A2"));
        assert_eq!(rec.field_str("check"), Some("unmatched"));
        assert!(rec.message.contains("A2"));

        let rec = ToolCallCheck::MissingId.to_log_record(&m).unwrap();
        assert_eq!(rec.field_str("check"), Some("missing_id"));
        assert!(ToolCallCheck::Matched.to_log_record(&m).is_none());
        assert!(ToolCallCheck::NotApplicable.to_log_record(&m).is_none());
    }

    #[test]
    fn test_pending_tool_call_ids() {
        let history = vec![
            Message::assistant_with_tool_calls("", vec![call("a"), call("b"), call("c")]),
            Message::tool_result("b", "ok"),
            Message::new(Role::Tool, "no id"),
        ];
        assert_eq!(pending_tool_call_ids(&history), vec!["a", "c"]);
        assert!(pending_tool_call_ids(&[]).is_empty());
    }
}
