//! 翻訳ソースの取り込み
//!
//! ソースはフラットな JSON オブジェクト（`"原文": "翻訳"`）。取り込み方はファイル名で決まる:
//! - 分割サフィックスで終わる stem（`items_split.json`）は `split_fragments` へ
//! - 書式サフィックスで終わる stem（`stats_format.json`）は `format_normalized` へ
//! - `mentionSplitFiles` / `dollarColorFiles` に含まれるファイルは対応する変換を適用
//! - それ以外は呼び出し元の指定（`exact` または `secondary`）へ

use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use super::catalog::{
    CatalogError,
    find_translation_files,
};
use super::store::{
    Dictionary,
    Layer,
};
use super::transforms::{
    cross_link_tags,
    expand_dollar_color,
    split_mentions,
};
use crate::config::EngineSettings;
use crate::pattern::RegexRule;

/// 翻訳ソース読み込み時のエラー
#[derive(Error, Debug)]
pub enum LoadError {
    /// ファイル読み込みエラー
    #[error("Failed to read translation file: {0}")]
    Io(#[from] std::io::Error),

    /// JSON パースエラー
    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// トップレベルがオブジェクトでない
    #[error("Translation source must be a JSON object")]
    NotAnObject,
}

/// 複数ファイル読み込みの集計
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// 読み込めたファイル数
    pub files_loaded: usize,
    /// 読み込めずにスキップしたファイル数
    pub files_skipped: usize,
    /// 取り込んだエントリ数
    pub entries: usize,
}

impl LoadReport {
    /// 1 ファイルの読み込み結果を集計に加える（失敗は警告ログを出してスキップ扱い）
    fn absorb(&mut self, result: Result<usize, LoadError>, path: &Path) {
        match result {
            Ok(entries) => {
                self.files_loaded += 1;
                self.entries += entries;
            }
            Err(error) => {
                tracing::warn!(file = %path.display(), %error, "Skipping translation source");
                self.files_skipped += 1;
            }
        }
    }
}

/// 翻訳ソースから [`Dictionary`] を構築する
#[derive(Debug, Clone, Copy)]
pub struct Loader<'a> {
    /// ファイル名の判定と変換に使う設定
    settings: &'a EngineSettings,
}

impl<'a> Loader<'a> {
    /// 設定を参照する Loader を作成する
    #[must_use]
    pub const fn new(settings: &'a EngineSettings) -> Self {
        Self { settings }
    }

    /// `base` として読み込むファイル `file_name` の格納先を判定する
    #[must_use]
    pub fn layer_for(&self, file_name: &str, base: Layer) -> Layer {
        let stem = Path::new(file_name).file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
        if stem.ends_with(&self.settings.split_suffix) {
            Layer::SplitFragments
        } else if stem.ends_with(&self.settings.format_suffix) {
            Layer::FormatNormalized
        } else {
            base
        }
    }

    /// ロケールディレクトリ全体を新しい辞書に読み込む
    ///
    /// 補助サブディレクトリ以下のファイルは `secondary` へ、それ以外は `exact`
    /// （またはサフィックスで決まる辞書）へ格納する。読めないファイルや不正なファイルはスキップする。
    /// 最後にタグの相互リンクを実行する。
    ///
    /// # Errors
    /// 探索用の glob が不正な場合
    pub fn load_locale(&self, locale_dir: &Path) -> Result<(Dictionary, LoadReport), CatalogError> {
        let mut dictionary = Dictionary::new();
        let mut report = LoadReport::default();

        let secondary = &self.settings.secondary_dir;
        let exclude =
            if secondary.is_empty() { Vec::new() } else { vec![format!("{secondary}/**")] };
        for path in find_translation_files(locale_dir, &self.settings.file_pattern, &exclude)? {
            report.absorb(self.load_file(&mut dictionary, &path, Layer::Exact), &path);
        }

        if !secondary.is_empty() {
            let secondary_dir = locale_dir.join(secondary);
            for path in find_translation_files(&secondary_dir, &self.settings.file_pattern, &[])? {
                report.absorb(self.load_file(&mut dictionary, &path, Layer::Secondary), &path);
            }
        }

        let linked = link_tag_fragments(&mut dictionary);
        tracing::info!(
            dir = %locale_dir.display(),
            files = report.files_loaded,
            skipped = report.files_skipped,
            entries = report.entries,
            rules = dictionary.regex_rules.len(),
            linked,
            "Loaded locale"
        );

        Ok((dictionary, report))
    }

    /// `dir` 以下の対象ファイルをすべて `dictionary` に追加で読み込む（既存のエントリは消さない）
    ///
    /// # Errors
    /// 探索用の glob が不正な場合
    pub fn load_directory(
        &self,
        dictionary: &mut Dictionary,
        dir: &Path,
        base: Layer,
    ) -> Result<LoadReport, CatalogError> {
        let mut report = LoadReport::default();
        for path in find_translation_files(dir, &self.settings.file_pattern, &[])? {
            report.absorb(self.load_file(dictionary, &path, base), &path);
        }
        Ok(report)
    }

    /// 1 ファイルを読み込んで取り込む
    ///
    /// # Returns
    /// 取り込んだエントリ数
    ///
    /// # Errors
    /// ファイル読み込みまたは JSON パースの失敗（辞書は変更されない）
    pub fn load_file(
        &self,
        dictionary: &mut Dictionary,
        path: &Path,
        base: Layer,
    ) -> Result<usize, LoadError> {
        let content = std::fs::read_to_string(path)?;
        let file_name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        self.load_source(dictionary, &file_name, &content, base)
    }

    /// JSON ソースを 1 つ取り込む
    ///
    /// # Arguments
    /// * `dictionary` - 格納先の辞書
    /// * `file_name` - 格納先と変換の判定に使うファイル名
    /// * `content` - JSON テキスト
    /// * `base` - サフィックスに該当しない場合の格納先
    ///
    /// # Errors
    /// JSON パースの失敗、またはオブジェクトでない（辞書は変更されない）
    pub fn load_source(
        &self,
        dictionary: &mut Dictionary,
        file_name: &str,
        content: &str,
        base: Layer,
    ) -> Result<usize, LoadError> {
        let entries = parse_entries(content)?;
        let layer = self.layer_for(file_name, base);
        let count = entries.len();

        if matches!(layer, Layer::SplitFragments | Layer::FormatNormalized) {
            for (key, value) in entries {
                dictionary.insert(layer, key, value);
            }
            tracing::debug!(file = file_name, ?layer, count, "Loaded translation source");
            return Ok(count);
        }

        let split_mentions_enabled = self.settings.mention_split_files.iter().any(|f| f == file_name);
        let dollar_color_enabled = self.settings.dollar_color_files.iter().any(|f| f == file_name);

        for (key, value) in entries {
            let expanded = if dollar_color_enabled {
                expand_dollar_color(&key, &value, &self.settings.color_markup)
            } else {
                vec![(key, value)]
            };

            for (key, value) in expanded {
                if split_mentions_enabled && let Some(pairs) = split_mentions(&key, &value) {
                    for (key, value) in pairs {
                        insert_entry(dictionary, layer, key, value);
                    }
                    continue;
                }
                insert_entry(dictionary, layer, key, value);
            }
        }

        tracing::debug!(file = file_name, ?layer, count, "Loaded translation source");
        Ok(count)
    }
}

/// エントリを追加し、テンプレートキーなら正規表現ルールも追加する
pub fn insert_entry(dictionary: &mut Dictionary, layer: Layer, key: String, value: String) {
    if key.contains('{') {
        match RegexRule::from_template(&key, &value) {
            Ok(Some(rule)) => dictionary.push_rule(rule),
            Ok(None) => {}
            Err(error) => tracing::warn!(key = %key, %error, "Discarding regex rule"),
        }
    }
    dictionary.insert(layer, key, value);
}

/// マークアップを含む `exact` のエントリから断片のエントリを追加する
///
/// # Returns
/// 追加したエントリ数
pub fn link_tag_fragments(dictionary: &mut Dictionary) -> usize {
    let links = cross_link_tags(&dictionary.exact);
    let count = links.len();
    for (key, value) in links {
        dictionary.insert(Layer::Exact, key, value);
    }
    count
}

/// フラットな JSON オブジェクトをパースする（文字列以外の値はスキップ）
fn parse_entries(content: &str) -> Result<Vec<(String, String)>, LoadError> {
    let json: Value = serde_json::from_str(content)?;
    let Value::Object(map) = json else {
        return Err(LoadError::NotAnObject);
    };

    Ok(map
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(value) => Some((key, value)),
            other => {
                tracing::debug!(key = %key, value = %other, "Skipping non-string translation value");
                None
            }
        })
        .collect())
}
