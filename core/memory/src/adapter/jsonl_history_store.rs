//! JSONL ファイルに追記する永続履歴ストア
//!
//! ファイルには全メッセージを 1 行 1 件で残し、メモリ上には末尾 max_messages 件の窓を持つ。
//! 書き込みに失敗した場合は窓を更新せずにエラーを返す。

use crate::adapter::BoundedHistory;
use crate::ports::outbound::HistoryStore;
use common::error::Error;
use common::msg::Message;
use common::ports::outbound::FileSystem;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct JsonlHistoryStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
    window: BoundedHistory,
}

impl JsonlHistoryStore {
    /// ファイルが既にあれば読み込んで窓を復元する（空行は無視）
    pub fn open(
        fs: Arc<dyn FileSystem>,
        path: impl AsRef<Path>,
        max_messages: usize,
    ) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let mut window = BoundedHistory::new(max_messages)?;
        if fs.exists(&path) {
            let body = fs.read_to_string(&path)?;
            for (i, line) in body.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let message: Message = serde_json::from_str(line).map_err(|e| {
                    Error::json(format!("{}:{}: {}", path.display(), i + 1, e))
                })?;
                window.append(message)?;
            }
        }
        Ok(Self { fs, path, window })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&self, message: &Message) -> Result<(), Error> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.fs.create_dir_all(parent)?;
        }
        // 改行まで 1 回で書く（途中失敗で次の行と連結されないように）
        let mut line = serde_json::to_string(message)?;
        line.push('\n');
        let mut w = self.fs.open_append(&self.path)?;
        w.write_all(line.as_bytes())
            .and_then(|_| w.flush())
            .map_err(|e| {
                Error::io_msg(format!("Failed to append to '{}': {}", self.path.display(), e))
            })
    }
}

impl HistoryStore for JsonlHistoryStore {
    fn append(&mut self, message: Message) -> Result<(), Error> {
        self.write_line(&message)?;
        self.window.append(message)
    }

    fn messages(&self) -> &[Message] {
        self.window.messages()
    }

    fn max_messages(&self) -> usize {
        self.window.max_messages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::adapter::StdFileSystem;
    use common::ports::outbound::FileMetadata;
    use std::sync::Mutex;

    /// テスト用: open_append の writer に渡された write_all 呼び出しを記録する
    #[derive(Default)]
    struct RecordingFs {
        chunks: Arc<Mutex<Vec<Vec<u8>>>>,
    }

    struct RecordingWriter(Arc<Mutex<Vec<Vec<u8>>>>);

    impl Write for RecordingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl FileSystem for RecordingFs {
        fn read_to_string(&self, path: &Path) -> Result<String, Error> {
            Err(Error::io_msg(format!("not found: {}", path.display())))
        }

        fn create_dir_all(&self, _path: &Path) -> Result<(), Error> {
            Ok(())
        }

        fn metadata(&self, path: &Path) -> Result<FileMetadata, Error> {
            Err(Error::io_msg(format!("not found: {}", path.display())))
        }

        fn open_append(&self, _path: &Path) -> Result<Box<dyn Write + Send>, Error> {
            Ok(Box::new(RecordingWriter(Arc::clone(&self.chunks))))
        }
    }

    fn fs() -> Arc<dyn FileSystem> {
        Arc::new(StdFileSystem)
    }

    #[test]
    fn test_append_then_reopen_restores_tail() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("session").join("history.jsonl");
        {
            let mut store = JsonlHistoryStore::open(fs(), &path, 2).unwrap();
            assert!(store.is_empty());
            store.append(Message::user("one")).unwrap();
            store.append(Message::assistant("two")).unwrap();
            store.append(Message::user("three")).unwrap();
            assert_eq!(store.len(), 2);
        }
        let body = std::fs::read_to_string(&path).unwrap();
        assert_eq!(body.lines().count(), 3);

        let store = JsonlHistoryStore::open(fs(), &path, 2).unwrap();
        let contents: Vec<&str> = store.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["two", "three"]);
        assert_eq!(store.max_messages(), 2);
    }

    #[test]
    fn test_open_skips_blank_lines() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("h.jsonl");
        std::fs::write(
            &path,
            "{\"role\":\"user\",\"content\":\"a\"}\n\n{\"role\":\"assistant\",\"content\":\"b\"}\n",
        )
        .unwrap();
        let store = JsonlHistoryStore::open(fs(), &path, 10).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_open_reports_corrupt_line_number() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("h.jsonl");
        std::fs::write(&path, "{\"role\":\"user\",\"content\":\"a\"}\nnot json\n").unwrap();
        let err = JsonlHistoryStore::open(fs(), &path, 10).err().unwrap();
        match err {
            Error::Json(msg) => assert!(msg.contains(":2:"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_write_failure_leaves_window_unchanged() {
        let temp = tempfile::tempdir().unwrap();
        // ディレクトリを追記先にすると open_append が失敗する
        let mut store = JsonlHistoryStore {
            fs: fs(),
            path: temp.path().to_path_buf(),
            window: BoundedHistory::new(5).unwrap(),
        };
        let err = store.append(Message::user("lost")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_record_and_newline_written_in_one_call() {
        let recording = RecordingFs::default();
        let chunks = Arc::clone(&recording.chunks);
        let mut store = JsonlHistoryStore::open(Arc::new(recording), "h.jsonl", 5).unwrap();
        store.append(Message::user("a")).unwrap();
        store.append(Message::user("b")).unwrap();

        let chunks = chunks.lock().unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], b"{\"role\":\"user\",\"content\":\"a\"}\n".to_vec());
        assert!(chunks[1].ends_with(b"\n"));
    }
}
