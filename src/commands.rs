//! デバッグコマンドの実行
//!
//! コマンドは 1 行で、名前と省略可能な引数を空白で区切る。

use crate::dictionary::LoadReport;
use crate::engine::{
    Engine,
    EngineError,
};

/// ダンプページを 1 つ進める
pub const NEXT_PAGE: &str = "dump.nextPage";
/// ダンプページを 1 つ戻す
pub const PREV_PAGE: &str = "dump.prevPage";
/// 現在のロケールの翻訳を再読み込みする
pub const RELOAD: &str = "engine.reload";
/// ロケールを切り替えて翻訳を読み込む
pub const SET_LOCALE: &str = "engine.setLocale";

/// コマンドの実行結果（ホスト側で表示する）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// 変更後のダンプページ
    DumpPage(usize),
    /// ダンプが無効（ページ操作は効果なし）
    DumpDisabled,
    /// 有効になったロケールで読み込んだエントリ
    Loaded {
        /// 有効なロケール
        locale: String,
        /// 読み込んだファイル数
        files: usize,
        /// 読み込んだエントリ数
        entries: usize,
    },
    /// コマンドは解釈できたが失敗した（Engine は変更されない）
    Failed(String),
    /// 未知のコマンド名
    Unknown(String),
}

impl std::fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DumpPage(page) => write!(f, "dump page {page}"),
            Self::DumpDisabled => write!(f, "dumping is disabled"),
            Self::Loaded { locale, files, entries } => {
                write!(f, "loaded {locale}: {entries} entries from {files} files")
            }
            Self::Failed(message) => write!(f, "failed: {message}"),
            Self::Unknown(command) => write!(f, "unknown command: {command}"),
        }
    }
}

/// `engine` に対してコマンドを 1 つ実行する
pub fn execute(engine: &mut Engine, command: &str) -> CommandOutcome {
    let command = command.trim();
    let (name, argument) = match command.split_once(char::is_whitespace) {
        Some((name, argument)) => (name, argument.trim()),
        None => (command, ""),
    };
    tracing::debug!(command = name, argument, "Execute command");

    match name {
        NEXT_PAGE => page(engine.next_dump_page()),
        PREV_PAGE => page(engine.prev_dump_page()),
        RELOAD => loaded(engine, Engine::reload),
        SET_LOCALE => {
            if argument.is_empty() {
                tracing::warn!("{} requires a locale argument", SET_LOCALE);
                return CommandOutcome::Failed(format!("usage: {SET_LOCALE} <locale>"));
            }
            loaded(engine, |engine| engine.set_locale(argument))
        }
        _ => {
            tracing::warn!("Unknown command: {}", name);
            CommandOutcome::Unknown(name.to_string())
        }
    }
}

/// ページ操作の結果を変換する（`None` はダンプ無効）
fn page(page: Option<usize>) -> CommandOutcome {
    page.map_or(CommandOutcome::DumpDisabled, CommandOutcome::DumpPage)
}

/// 読み込み処理を実行し、結果を `Loaded` または `Failed` に変換する
fn loaded<F>(engine: &mut Engine, load: F) -> CommandOutcome
where
    F: FnOnce(&mut Engine) -> Result<LoadReport, EngineError>,
{
    match load(engine) {
        Ok(report) => CommandOutcome::Loaded {
            locale: engine.locale().to_string(),
            files: report.files_loaded,
            entries: report.entries,
        },
        Err(error) => {
            tracing::error!(%error, "Command failed");
            CommandOutcome::Failed(error.to_string())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::config::ConfigManager;
    use crate::test_utils::{
        open_engine,
        write_file,
    };

    #[rstest]
    #[case::next(NEXT_PAGE)]
    #[case::prev(PREV_PAGE)]
    fn page_commands_without_dump(#[case] command: &str) {
        let mut engine = Engine::new(ConfigManager::new());

        assert_that!(execute(&mut engine, command), eq(&CommandOutcome::DumpDisabled));
    }

    #[tokio::test]
    async fn page_commands_rotate() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "localizer.json", r#"{"dump": {"enabled": true}}"#);
        let mut engine = open_engine(temp_dir.path());

        assert_eq!(execute(&mut engine, "dump.nextPage"), CommandOutcome::DumpPage(1));
        assert_eq!(execute(&mut engine, "dump.nextPage"), CommandOutcome::DumpPage(2));
        assert_eq!(execute(&mut engine, "dump.prevPage"), CommandOutcome::DumpPage(1));
    }

    #[rstest]
    fn set_locale_command() {
        let temp_dir = TempDir::new().unwrap();
        write_file(
            temp_dir.path(),
            "translations/ja/main.json",
            r#"{"Hello": "こんにちは", "Bye": "じゃあね"}"#,
        );
        let mut engine = open_engine(temp_dir.path());

        let outcome = execute(&mut engine, "engine.setLocale  ja ");

        assert_that!(
            outcome,
            eq(&CommandOutcome::Loaded { locale: "ja".to_string(), files: 1, entries: 2 })
        );
    }

    #[rstest]
    fn set_locale_without_argument_fails() {
        let mut engine = Engine::new(ConfigManager::new());

        assert!(matches!(execute(&mut engine, SET_LOCALE), CommandOutcome::Failed(_)));
        assert_that!(engine.locale(), eq("zh-CN"));
    }

    #[rstest]
    fn reload_command() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "translations/zh-CN/main.json", r#"{"Hello": "你好"}"#);
        let mut engine = open_engine(temp_dir.path());

        let outcome = execute(&mut engine, RELOAD);

        assert_that!(
            outcome,
            eq(&CommandOutcome::Loaded { locale: "zh-CN".to_string(), files: 1, entries: 1 })
        );
    }

    #[rstest]
    fn unknown_command() {
        let mut engine = Engine::new(ConfigManager::new());

        assert_that!(
            execute(&mut engine, "dump.clear now"),
            eq(&CommandOutcome::Unknown("dump.clear".to_string()))
        );
    }
}
