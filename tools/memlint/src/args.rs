use clap::builder::ArgAction;
use clap::value_parser;
use common::error::Error;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    /// 検査する会話ログ（1 行 1 メッセージの JSONL）
    pub transcript: PathBuf,
    /// -c / --config: memory.json のパス（未指定なら AGENT_MEMORY_CONFIG）
    pub config_path: Option<PathBuf>,
    /// -n / --max-messages: 設定ファイルより優先する履歴上限
    pub max_messages: Option<usize>,
    /// --log-file: ログレコード（警告・進行状況）を JSONL でも追記するファイル
    pub log_file: Option<PathBuf>,
    /// --store: 会話ログを追記する永続履歴（JSONL）。既存の内容を復元してから流し込む
    pub store_path: Option<PathBuf>,
    /// --strict: 警告が 1 件でもあれば終了コード 1
    pub strict: bool,
    /// -v / --verbose: info 以下のログも stderr に出す
    pub verbose: bool,
}

/// 解析結果: 通常の Config / ヘルプ・バージョン表示
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Config(Config),
    /// clap が整形したヘルプ・バージョン文字列（stdout に出して終了コード 0）
    Display(String),
}

fn build_clap_command() -> clap::Command {
    clap::Command::new("memlint")
        .about("Replay a JSONL conversation transcript and report tool/assistant pairing warnings")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            clap::Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Path to memory.json (default: $AGENT_MEMORY_CONFIG)")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            clap::Arg::new("max-messages")
                .short('n')
                .long("max-messages")
                .value_name("N")
                .help("History capacity; oldest messages are evicted beyond this")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            clap::Arg::new("log-file")
                .long("log-file")
                .value_name("PATH")
                .help("Also append log records (warnings and progress) as JSONL to this file")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            clap::Arg::new("store")
                .long("store")
                .value_name("PATH")
                .help("Persistent JSONL history to restore and append the transcript to")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            clap::Arg::new("strict")
                .long("strict")
                .help("Exit with status 1 when any warning is reported")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print info/debug log lines to stderr as well")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("transcript")
                .value_name("TRANSCRIPT")
                .help("JSONL file with one message per line")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
}

pub fn parse_args<I, T>(args: I) -> Result<ParseOutcome, Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = match build_clap_command().try_get_matches_from(args) {
        Ok(m) => m,
        Err(e) => {
            return match e.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                    Ok(ParseOutcome::Display(e.to_string()))
                }
                _ => Err(Error::invalid_argument(e.to_string())),
            };
        }
    };

    let max_messages = matches.get_one::<usize>("max-messages").copied();
    if max_messages == Some(0) {
        return Err(Error::invalid_argument("--max-messages must be greater than 0"));
    }

    Ok(ParseOutcome::Config(Config {
        transcript: matches
            .get_one::<PathBuf>("transcript")
            .cloned()
            .unwrap_or_default(),
        config_path: matches.get_one::<PathBuf>("config").cloned(),
        max_messages,
        log_file: matches.get_one::<PathBuf>("log-file").cloned(),
        store_path: matches.get_one::<PathBuf>("store").cloned(),
        strict: matches.get_flag("strict"),
        verbose: matches.get_flag("verbose"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> Config {
        match parse_args(args.iter().copied()).unwrap() {
            ParseOutcome::Config(c) => c,
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_minimal_args() {
        let c = config(&["memlint", "session.jsonl"]);
        assert_eq!(c.transcript, PathBuf::from("session.jsonl"));
        assert_eq!(c.max_messages, None);
        assert!(!c.strict);
        assert!(!c.verbose);
    }

    #[test]
    fn test_all_options() {
        let c = config(&[
            "memlint",
            "-c",
            "memory.json",
            "-n",
            "20",
            "--log-file",
            "warn.jsonl",
            "--store",
            "history.jsonl",
            "--strict",
            "-v",
            "t.jsonl",
        ]);
        assert_eq!(c.config_path, Some(PathBuf::from("memory.json")));
        assert_eq!(c.max_messages, Some(20));
        assert_eq!(c.log_file, Some(PathBuf::from("warn.jsonl")));
        assert_eq!(c.store_path, Some(PathBuf::from("history.jsonl")));
        assert!(c.strict);
        assert!(c.verbose);
    }

    #[test]
    fn test_missing_transcript_is_error() {
        let err = parse_args(["memlint"]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_zero_max_messages_is_error() {
        let err = parse_args(["memlint", "-n", "0", "t.jsonl"]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_help_is_display() {
        let outcome = parse_args(["memlint", "--help"]).unwrap();
        match outcome {
            ParseOutcome::Display(text) => {
                assert!(text.contains("--max-messages"));
                assert!(text.contains("--store"));
                assert!(!text.contains("Also append warnings"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
