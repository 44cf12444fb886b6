//! テンプレートキーから正規表現ルールを合成するモジュール
//!
//! `"Score: {0}"` のようなキーはパターン `^(?s)Score: (.+)$` に変換される。
//! 元テキストが全体一致した場合、キャプチャした値を翻訳テンプレートに埋め込む。

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// キャプチャグループ数の上限（超えるルールはロード時に破棄）
pub const MAX_CAPTURE_GROUPS: usize = 4;

/// `{index}` または `{index:format}`
#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\d+)(?::[^{}]*)?\}").expect("placeholder regex is valid"));

/// 日付・時刻書式のプレースホルダー（`{0:yyyy-MM-dd}`, `{0:HH:mm}`, `{0:'at' h}`）
///
/// 単一のキャプチャグループに逆変換できないため合成対象外。
#[allow(clippy::expect_used)]
static DATE_TIME_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{\d+:[^{}]*(?:yy|MM|dd|HH|hh|mm|ss|tt|'[^']*'|"[^"]*")[^{}]*\}"#)
        .expect("date/time placeholder regex is valid")
});

/// ルール構築時のエラー
#[derive(Error, Debug)]
pub enum PatternError {
    /// 正規表現のコンパイル失敗
    #[error("Failed to compile pattern '{pattern}': {source}")]
    Compile {
        /// 元のパターン
        pattern: String,
        /// regex クレートのエラー
        #[source]
        source: regex::Error,
    },

    /// キャプチャグループ数が上限を超えている
    #[error("Pattern has {0} capture groups (at most {MAX_CAPTURE_GROUPS} are supported)")]
    TooManyGroups(usize),
}

/// テンプレートキーを全体一致用の正規表現に変換する
///
/// プレースホルダーは左から順にキャプチャグループになる。グループの種類は直後の文字で決まる:
/// - 末尾: `(.+)`
/// - 直後が ASCII 文字 `c`: `([^c]+)`（隣接するプレースホルダーの `{` も含む）
/// - 直後がマルチバイト文字: `(.*?)`
///
/// # Returns
/// - `None`: テンプレートでないキー、または日付・時刻書式を含むキー
#[must_use]
pub fn synthesize(key: &str) -> Option<String> {
    if !key.contains('{') || DATE_TIME_PLACEHOLDER.is_match(key) {
        return None;
    }

    let mut pattern = String::from("^(?s)");
    let mut cursor = 0;
    let mut found = false;

    for whole in PLACEHOLDER.find_iter(key) {
        found = true;
        pattern.push_str(&regex::escape(key.get(cursor..whole.start())?));

        let group = match key.get(whole.end()..)?.chars().next() {
            None => "(.+)".to_string(),
            Some(next) if next.is_ascii() => format!("([^{}]+)", regex::escape(&next.to_string())),
            Some(_) => "(.*?)".to_string(),
        };
        pattern.push_str(&group);
        cursor = whole.end();
    }

    if !found {
        return None;
    }
    pattern.push_str(&regex::escape(key.get(cursor..)?));
    pattern.push('$');

    Some(pattern)
}

/// ルール評価の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleMatch {
    /// 一致しない
    NoMatch,
    /// 一致し、テンプレートに値を埋め込んだ結果
    Matched(String),
    /// 一致したが参加しなかったキャプチャグループがある
    Failed,
}

/// コンパイル済みの正規表現ルール（全体一致パターン + 翻訳テンプレート）
#[derive(Debug, Clone)]
pub struct RegexRule {
    /// `^(?:...)$` で固定したパターン
    regex: Regex,
    /// キャプチャグループ数（0〜`MAX_CAPTURE_GROUPS`）
    group_count: usize,
    /// 翻訳テンプレート（`{0}`〜`{3}` を含む）
    template: String,
    /// 元のキー（診断用）
    key: String,
}

impl RegexRule {
    /// テンプレートキーと翻訳からルールを作成する
    ///
    /// # Returns
    /// - `Ok(None)`: キーからパターンを合成できない
    pub fn from_template(key: &str, template: &str) -> Result<Option<Self>, PatternError> {
        let Some(pattern) = synthesize(key) else {
            return Ok(None);
        };
        Self::build(&pattern, template, key).map(Some)
    }

    /// 手書きのパターンからルールを作成する
    ///
    /// 全体一致のみ有効になるよう固定される。
    pub fn from_pattern(pattern: &str, template: &str) -> Result<Self, PatternError> {
        Self::build(pattern, template, pattern)
    }

    /// パターンをコンパイルし、グループ数を検証する
    fn build(pattern: &str, template: &str, key: &str) -> Result<Self, PatternError> {
        let anchored = format!("^(?:{pattern})$");
        let regex = Regex::new(&anchored)
            .map_err(|source| PatternError::Compile { pattern: pattern.to_string(), source })?;

        let group_count = regex.captures_len().saturating_sub(1);
        if group_count > MAX_CAPTURE_GROUPS {
            return Err(PatternError::TooManyGroups(group_count));
        }

        Ok(Self { regex, group_count, template: template.to_string(), key: key.to_string() })
    }

    /// キャプチャグループ数
    #[must_use]
    pub const fn group_count(&self) -> usize {
        self.group_count
    }

    /// 元のキー
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// 翻訳テンプレート
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// 全体一致を 1 回試みる
    ///
    /// グループ数 0 のルールは一致判定のみでテンプレートをそのまま返す。
    /// それ以外は `k` 番目（0 始まり）のキャプチャを `{k}` とその書式付き変形に埋め込む。
    #[must_use]
    pub fn evaluate(&self, text: &str) -> RuleMatch {
        if self.group_count == 0 {
            return if self.regex.is_match(text) {
                RuleMatch::Matched(self.template.clone())
            } else {
                RuleMatch::NoMatch
            };
        }

        let Some(captures) = self.regex.captures(text) else {
            return RuleMatch::NoMatch;
        };

        let mut values = Vec::with_capacity(self.group_count);
        for group in 1..=self.group_count {
            let Some(value) = captures.get(group) else {
                return RuleMatch::Failed;
            };
            values.push(value.as_str());
        }

        let mut translated = self.template.clone();
        for (index, value) in values.into_iter().enumerate() {
            translated = substitute_placeholder(&translated, index, value);
        }
        RuleMatch::Matched(translated)
    }
}

/// `{i}` と数値書式の変形（`{i:f}`, `{i:F}`, `{i:f1}`〜`{i:F9}`）を置換する
#[must_use]
pub fn substitute_placeholder(template: &str, index: usize, value: &str) -> String {
    let mut result = template.replace(&format!("{{{index}}}"), value);
    if !result.contains(&format!("{{{index}:")) {
        return result;
    }
    for format in ["f", "F"] {
        result = result.replace(&format!("{{{index}:{format}}}"), value);
        for precision in 1..=9 {
            result = result.replace(&format!("{{{index}:{format}{precision}}}"), value);
        }
    }
    result
}
