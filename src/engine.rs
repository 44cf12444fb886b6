//! ロケールとライフサイクルの制御
//!
//! [`Engine`] は設定・辞書・ダンプを所有する。読み込みは `&mut self`、解決は `&self` を取るため、
//! 読み込みと問い合わせが重なることはない。

use std::path::{
    Path,
    PathBuf,
};
use std::time::Duration;

use thiserror::Error;
use tokio::runtime::Handle;

use crate::config::{
    ConfigError,
    ConfigManager,
    EngineSettings,
};
use crate::dictionary::{
    CatalogError,
    Dictionary,
    Layer,
    LoadError,
    LoadReport,
    Loader,
    insert_entry,
    link_tag_fragments,
};
use crate::dump::DumpSink;
use crate::resolver::Resolver;
use crate::types::Outcome;

/// Engine 操作のエラー
#[derive(Error, Debug)]
pub enum EngineError {
    /// 設定エラー
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// 翻訳ファイル探索エラー
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// 1 ロケール分のローカライズセッション
pub struct Engine {
    /// 設定
    config_manager: ConfigManager,
    /// 有効なロケールの辞書
    dictionary: Dictionary,
    /// ダンプ（無効な場合は `None`）
    dump: Option<DumpSink>,
}

impl Engine {
    /// 空の辞書で Engine を作成する
    ///
    /// ダンプが有効で、tokio ランタイム上で呼ばれた場合だけダンプを接続する。
    #[must_use]
    pub fn new(config_manager: ConfigManager) -> Self {
        let dump = build_dump_sink(&config_manager);
        Self { config_manager, dictionary: Dictionary::new(), dump }
    }

    /// `root` の `localizer.json`（なければ既定値）と設定されたロケールを読み込む
    ///
    /// # Errors
    /// 設定または探索用 glob が不正な場合
    pub fn open(root: Option<PathBuf>) -> Result<Self, EngineError> {
        let mut config_manager = ConfigManager::new();
        config_manager.load_settings(root)?;

        let mut engine = Self::new(config_manager);
        engine.load_locale()?;
        Ok(engine)
    }

    /// 現在の設定
    #[must_use]
    pub const fn settings(&self) -> &EngineSettings {
        self.config_manager.get_settings()
    }

    /// 有効なロケール
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.settings().locale
    }

    /// 有効なロケールの辞書
    #[must_use]
    pub const fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// ダンプ（無効な場合は `None`）
    #[must_use]
    pub const fn dump_sink(&self) -> Option<&DumpSink> {
        self.dump.as_ref()
    }

    /// 辞書を設定されたロケールの内容で置き換える
    ///
    /// # Errors
    /// 探索用 glob が不正な場合（現在の辞書は保持される）
    pub fn load_locale(&mut self) -> Result<LoadReport, EngineError> {
        let locale_dir = self.config_manager.locale_dir(self.locale());
        let (dictionary, report) = Loader::new(self.settings()).load_locale(&locale_dir)?;

        if report.files_loaded == 0 {
            tracing::warn!(
                locale = %self.locale(),
                dir = %locale_dir.display(),
                "No translation sources found"
            );
        }
        self.dictionary = dictionary;
        Ok(report)
    }

    /// 設定ファイルを読み直し、有効なロケールを再読み込みする
    ///
    /// [`Engine::set_locale`] で選んだロケールは維持される。
    ///
    /// # Errors
    /// 設定または探索用 glob が不正な場合
    pub fn reload(&mut self) -> Result<LoadReport, EngineError> {
        let locale = self.locale().to_string();
        let root = self.config_manager.root().cloned();
        let dump_config = self.settings().dump.clone();

        let mut config_manager = ConfigManager::new();
        config_manager.load_settings(root)?;
        let mut settings = config_manager.get_settings().clone();
        settings.locale = locale;
        config_manager.update_settings(settings)?;

        if config_manager.get_settings().dump != dump_config {
            tracing::warn!("Dump settings changed; they take effect after a restart");
        }
        self.config_manager = config_manager;
        self.load_locale()
    }

    /// `locale` に切り替えて翻訳を読み込む
    ///
    /// # Errors
    /// ロケール名または探索用 glob が不正な場合（以前のロケールのまま）
    pub fn set_locale(&mut self, locale: &str) -> Result<LoadReport, EngineError> {
        let previous = self.settings().clone();
        let mut settings = previous.clone();
        settings.locale = locale.to_string();
        self.config_manager.update_settings(settings)?;

        match self.load_locale() {
            Ok(report) => {
                tracing::info!(locale, "Locale changed");
                Ok(report)
            }
            Err(error) => {
                self.config_manager.update_settings(previous)?;
                Err(error)
            }
        }
    }

    /// `dir` 以下の翻訳ファイルを現在の辞書に追加し、タグの相互リンクをやり直す
    ///
    /// 相対パスは設定ルート基準で解決する。
    ///
    /// # Errors
    /// 探索用 glob が不正な場合
    pub fn load_directory(&mut self, dir: &Path) -> Result<LoadReport, EngineError> {
        let dir = self.config_manager.resolve_path(&dir.to_string_lossy());
        let loader = Loader::new(self.config_manager.get_settings());
        let report = loader.load_directory(&mut self.dictionary, &dir, Layer::Exact)?;
        let linked = link_tag_fragments(&mut self.dictionary);
        tracing::info!(
            dir = %dir.display(),
            files = report.files_loaded,
            skipped = report.files_skipped,
            entries = report.entries,
            linked,
            "Merged translation directory"
        );
        Ok(report)
    }

    /// ホストから渡された JSON ソースを 1 つ現在の辞書に追加し、タグの相互リンクをやり直す
    ///
    /// `file_name` で格納先と変換を判定する。
    ///
    /// # Errors
    /// JSON パースの失敗、またはオブジェクトでない場合
    pub fn load_source(&mut self, file_name: &str, content: &str) -> Result<usize, LoadError> {
        let count = Loader::new(self.config_manager.get_settings()).load_source(
            &mut self.dictionary,
            file_name,
            content,
            Layer::Exact,
        )?;
        let linked = link_tag_fragments(&mut self.dictionary);
        tracing::debug!(file = file_name, count, linked, "Merged translation source");
        Ok(count)
    }

    /// `exact` にエントリを 1 つ追加する（テンプレートキーは正規表現ルールも生成）
    pub fn add_entry(&mut self, key: &str, value: &str) {
        insert_entry(&mut self.dictionary, Layer::Exact, key.to_string(), value.to_string());
    }

    /// `text` を解決する
    #[must_use]
    pub fn resolve(&self, text: &str) -> Outcome {
        Resolver::new(&self.dictionary, self.dump.as_ref()).resolve(text)
    }

    /// ホスト向けの [`Engine::resolve`]（`(found, translated)`、見つからなければ `text` を返す）
    #[must_use]
    pub fn resolve_pair(&self, text: &str) -> (bool, String) {
        self.resolve(text).into_pair(text)
    }

    /// Default ダンプファイルの現在のページ（ダンプ無効なら `None`）
    #[must_use]
    pub fn dump_page(&self) -> Option<usize> {
        self.dump.as_ref().map(DumpSink::page)
    }

    /// ダンプページを進める（ダンプ無効なら `None`）
    pub fn next_dump_page(&self) -> Option<usize> {
        self.dump.as_ref().map(DumpSink::next_page)
    }

    /// ダンプページを戻す（ダンプ無効なら `None`）
    pub fn prev_dump_page(&self) -> Option<usize> {
        self.dump.as_ref().map(DumpSink::prev_page)
    }

    /// 書き出し待ちをすべて書き出す（失敗はログに出す）
    pub async fn shutdown(&self) {
        let Some(dump) = &self.dump else {
            return;
        };
        match dump.flush_now().await {
            Ok(written) => tracing::info!(written, "Flushed dump buffers"),
            Err(error) => tracing::error!(%error, "Final dump flush failed"),
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("locale", &self.locale())
            .field("entries", &self.dictionary.len())
            .field("rules", &self.dictionary.regex_rules.len())
            .field("dump", &self.dump)
            .finish()
    }
}

/// 設定に従って DumpSink を作成する
fn build_dump_sink(config_manager: &ConfigManager) -> Option<DumpSink> {
    let dump = &config_manager.get_settings().dump;
    if !dump.enabled {
        return None;
    }

    let Ok(runtime) = Handle::try_current() else {
        tracing::warn!("Dumping is enabled but no tokio runtime is running; dumping disabled");
        return None;
    };

    let directory = config_manager.dump_dir();
    tracing::debug!(dir = %directory.display(), debounce_ms = dump.debounce_ms, "Dump sink enabled");
    Some(DumpSink::new(directory, Duration::from_millis(dump.debounce_ms), runtime))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::test_utils::{
        open_engine,
        write_file,
    };

    fn translated(text: &str) -> Outcome {
        Outcome::Translated(text.to_string())
    }

    #[rstest]
    fn open_loads_configured_locale() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "translations/zh-CN/main.json", r#"{"Hello": "你好"}"#);
        write_file(temp_dir.path(), "translations/zh-CN/secondary/extra.json", r#"{"Bye": "再见"}"#);

        let engine = open_engine(temp_dir.path());

        assert_that!(engine.resolve("Hello"), eq(&translated("你好")));
        assert_that!(engine.resolve("Bye"), eq(&translated("再见")));
        assert_that!(engine.resolve_pair("Nope"), eq(&(false, "Nope".to_string())));
    }

    #[rstest]
    fn dump_disabled_without_runtime() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "localizer.json", r#"{"dump": {"enabled": true}}"#);

        let engine = open_engine(temp_dir.path());

        assert_that!(engine.dump_sink().is_none(), eq(true));
        assert_that!(engine.next_dump_page(), none());
    }

    #[rstest]
    fn set_locale_swaps_dictionaries() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "translations/zh-CN/main.json", r#"{"Hello": "你好"}"#);
        write_file(temp_dir.path(), "translations/ja/main.json", r#"{"Hello": "こんにちは"}"#);
        let mut engine = open_engine(temp_dir.path());

        let report = engine.set_locale("ja").unwrap();

        assert_that!(report.files_loaded, eq(1));
        assert_that!(engine.locale(), eq("ja"));
        assert_that!(engine.resolve("Hello"), eq(&translated("こんにちは")));
    }

    #[rstest]
    fn set_locale_rejects_empty_name() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "translations/zh-CN/main.json", r#"{"Hello": "你好"}"#);
        let mut engine = open_engine(temp_dir.path());

        let result = engine.set_locale("");

        assert_that!(result, err(anything()));
        assert_that!(engine.locale(), eq("zh-CN"));
        assert_that!(engine.resolve("Hello"), eq(&translated("你好")));
    }

    #[rstest]
    fn reload_picks_up_changes_and_keeps_locale() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "translations/ja/main.json", r#"{"Hello": "こんにちは"}"#);
        let mut engine = open_engine(temp_dir.path());
        engine.set_locale("ja").unwrap();

        write_file(temp_dir.path(), "translations/ja/main.json", r#"{"Hello": "やあ"}"#);
        engine.reload().unwrap();

        assert_that!(engine.locale(), eq("ja"));
        assert_that!(engine.resolve("Hello"), eq(&translated("やあ")));
    }

    #[rstest]
    fn reload_clears_removed_entries() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "translations/zh-CN/a.json", r#"{"Hello": "你好"}"#);
        let mut engine = open_engine(temp_dir.path());
        engine.add_entry("Added", "添加");

        engine.reload().unwrap();

        assert_that!(engine.resolve("Added"), eq(&Outcome::NotFound));
        assert_that!(engine.resolve("Hello"), eq(&translated("你好")));
    }

    #[rstest]
    fn load_directory_merges() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "translations/zh-CN/main.json", r#"{"Hello": "你好"}"#);
        write_file(temp_dir.path(), "resources/ui.json", r#"{"Start": "开始"}"#);
        let mut engine = open_engine(temp_dir.path());

        let report = engine.load_directory(Path::new("resources")).unwrap();

        assert_that!(report.files_loaded, eq(1));
        assert_that!(engine.resolve("Hello"), eq(&translated("你好")));
        assert_that!(engine.resolve("Start"), eq(&translated("开始")));
    }

    #[rstest]
    fn load_directory_links_tag_fragments() {
        let temp_dir = TempDir::new().unwrap();
        write_file(
            temp_dir.path(),
            "resources/ui.json",
            r#"{"Deal <b>6</b> damage": "造成<b>6</b>伤害"}"#,
        );
        let mut engine = open_engine(temp_dir.path());

        engine.load_directory(Path::new("resources")).unwrap();

        assert_that!(engine.resolve("Deal"), eq(&translated("造成")));
        assert_that!(engine.resolve("damage"), eq(&translated("伤害")));
    }

    #[rstest]
    fn load_source_links_tag_fragments() {
        let mut engine = Engine::new(ConfigManager::new());

        engine.load_source("ui.json", r#"{"Deal <b>6</b> damage": "造成<b>6</b>伤害"}"#).unwrap();

        assert_that!(engine.resolve("Deal"), eq(&translated("造成")));
        assert_that!(engine.dictionary().exact.get("damage"), some(eq(&"伤害".to_string())));
    }

    #[rstest]
    fn load_source_applies_suffix_dispatch() {
        let mut engine = Engine::new(ConfigManager::new());

        engine.load_source("ui_split.json", r#"{"Deal": "造成", "damage": "伤害"}"#).unwrap();

        assert_that!(engine.resolve("Deal 3 damage"), eq(&translated("造成 3 伤害")));
        assert_that!(engine.load_source("bad.json", "[1, 2]"), err(anything()));
    }

    #[rstest]
    fn add_entry_synthesizes_rule() {
        let mut engine = Engine::new(ConfigManager::new());

        engine.add_entry("Score: {0}", "得分：{0}");

        assert_that!(engine.resolve("Score: 99"), eq(&translated("得分：99")));
    }

    #[tokio::test]
    async fn dump_pages_rotate() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "localizer.json", r#"{"dump": {"enabled": true}}"#);
        let engine = open_engine(temp_dir.path());

        assert_eq!(engine.dump_page(), Some(0));
        assert_eq!(engine.next_dump_page(), Some(1));
        assert_eq!(engine.prev_dump_page(), Some(0));
        assert_eq!(engine.prev_dump_page(), Some(0));
    }

    #[tokio::test]
    async fn shutdown_flushes_pending_misses() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "localizer.json", r#"{"dump": {"enabled": true}}"#);
        let engine = open_engine(temp_dir.path());

        assert_eq!(engine.resolve("Unknown Text"), Outcome::NotFound);
        engine.shutdown().await;

        let dump_file = temp_dir.path().join("dump").join("dump_0.json");
        let written = std::fs::read_to_string(dump_file).unwrap();
        assert!(written.contains("Unknown Text"));
    }
}
