//! 会話メモリのドメイン（tool_call 対応検査と検証付き履歴）

pub mod tool_call_check;
pub mod validated_history;

pub use tool_call_check::{
    check_tool_message, find_declaring_assistant, pending_tool_call_ids, ToolCallCheck,
};
pub use validated_history::ValidatedHistory;
