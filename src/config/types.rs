//! 設定の型と検証

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

/// 設定項目 1 つの検証エラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// フィールドの JSON パス（例: "dump.debounceMs"）
    pub field_path: String,
    /// エラーメッセージ
    pub message: String,
}

impl ValidationError {
    /// 検証エラーを作成する
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

/// 設定の読み込み・検証エラー
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 検証エラー（複数）
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    /// 設定ファイルの読み込みエラー
    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// 設定ファイルのパースエラー
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// 検証エラーを番号付きの行に整形する
fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// エンジン設定（`localizer.json`）
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    /// 有効なロケール（`translation_root` 以下のディレクトリ名）
    pub locale: String,

    /// ロケールごとのサブディレクトリを持つディレクトリ（相対パスは設定ルート基準）
    pub translation_root: String,

    /// ロケールディレクトリ内の翻訳ファイルを選ぶ glob
    pub file_pattern: String,

    /// 補助辞書に読み込むロケール内のサブディレクトリ
    pub secondary_dir: String,

    /// 断片辞書に振り分けるファイル stem のサフィックス
    pub split_suffix: String,
    /// 正規化テンプレート辞書に振り分けるファイル stem のサフィックス
    pub format_suffix: String,

    /// `[@N]` メンションで分割するファイル名
    pub mention_split_files: Vec<String>,
    /// `$` の強調表示を展開するファイル名
    pub dollar_color_files: Vec<String>,
    /// `$` の展開に使うマークアップ
    pub color_markup: ColorMarkup,

    /// ダンプ設定
    pub dump: DumpConfig,
}

/// `$` の強調表示を置き換えるマークアップ
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColorMarkup {
    /// 開始タグ
    pub open: String,
    /// 終了タグ
    pub close: String,
}

impl Default for ColorMarkup {
    fn default() -> Self {
        Self { open: "<color=#FFD700>".to_string(), close: "</color>".to_string() }
    }
}

/// 未翻訳文字列のダンプ設定
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DumpConfig {
    /// 未翻訳の文字列を記録するか
    pub enabled: bool,
    /// 書き出し先ディレクトリ（相対パスは設定ルート基準）
    pub directory: String,
    /// 最初の記録から書き出しまでの待ち時間（ミリ秒）
    pub debounce_ms: u64,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self { enabled: false, directory: "dump".to_string(), debounce_ms: 5000 }
    }
}

impl EngineSettings {
    /// 設定値を検証する
    ///
    /// # Errors
    /// - 必須項目が空
    /// - glob パターンが不正
    /// - サフィックスが重複
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.locale.trim().is_empty() {
            errors.push(ValidationError::new(
                "locale",
                "The locale cannot be empty. Example: \"zh-CN\"",
            ));
        }

        if self.translation_root.is_empty() {
            errors.push(ValidationError::new(
                "translationRoot",
                "The directory cannot be empty. Example: \"translations\"",
            ));
        }

        if self.file_pattern.is_empty() {
            errors.push(ValidationError::new(
                "filePattern",
                "The pattern cannot be empty. Example: \"**/*.json\"",
            ));
        } else if let Err(e) = globset::Glob::new(&self.file_pattern) {
            errors.push(ValidationError::new(
                "filePattern",
                format!("Invalid glob pattern '{}': {e}", self.file_pattern),
            ));
        }

        if self.split_suffix.is_empty() {
            errors.push(ValidationError::new("splitSuffix", "The suffix cannot be empty"));
        }
        if self.format_suffix.is_empty() {
            errors.push(ValidationError::new("formatSuffix", "The suffix cannot be empty"));
        }
        if !self.split_suffix.is_empty() && self.split_suffix == self.format_suffix {
            errors.push(ValidationError::new(
                "splitSuffix/formatSuffix",
                "The split and format suffixes must differ",
            ));
        }

        if self.color_markup.open.is_empty() || self.color_markup.close.is_empty() {
            errors.push(ValidationError::new(
                "colorMarkup",
                "Both 'open' and 'close' markup are required. Example: \"<color=#FFD700>\", \"</color>\"",
            ));
        }

        if self.dump.debounce_ms == 0 {
            errors.push(ValidationError::new(
                "dump.debounceMs",
                "The debounce interval must be greater than zero",
            ));
        }
        if self.dump.directory.is_empty() {
            errors.push(ValidationError::new("dump.directory", "The directory cannot be empty"));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            locale: "zh-CN".to_string(),
            translation_root: "translations".to_string(),
            file_pattern: "**/*.json".to_string(),
            secondary_dir: "secondary".to_string(),
            split_suffix: "_split".to_string(),
            format_suffix: "_format".to_string(),
            mention_split_files: Vec::new(),
            dollar_color_files: Vec::new(),
            color_markup: ColorMarkup::default(),
            dump: DumpConfig::default(),
        }
    }
}
