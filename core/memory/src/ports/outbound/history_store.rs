//! 履歴ストアの Outbound ポート
//!
//! 上限付き・追記専用のメッセージ列。上限を超えたら古い順に捨てる（FIFO）。
//! 捨て方はストア側の責務で、検証層は関与しない。

use common::error::Error;
use common::msg::Message;

/// 会話履歴を保持する能力
pub trait HistoryStore {
    /// 1 件追記する（上限超過分はストアが古い順に捨てる）
    fn append(&mut self, message: Message) -> Result<(), Error>;

    /// 現在保持しているメッセージ（古い順）
    fn messages(&self) -> &[Message];

    /// 保持できる最大メッセージ数
    fn max_messages(&self) -> usize;

    fn len(&self) -> usize {
        self.messages().len()
    }

    fn is_empty(&self) -> bool {
        self.messages().is_empty()
    }
}
