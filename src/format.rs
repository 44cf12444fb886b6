//! 書式の正規化（数値を位置指定のプレースホルダーに置き換える）
//!
//! `"Deal 12 damage to 3 enemies"` は値 `["12", "3"]` と
//! `"Deal {0} damage to {1} enemies"` に正規化される。
//! 標準形に対する翻訳テンプレートは [`merge`] で具体的なテキストに戻す。

use std::sync::LazyLock;

use regex::Regex;

/// 翻訳テンプレート内のプレースホルダー
#[allow(clippy::expect_used)]
static TEMPLATE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\d+)\}").expect("template placeholder regex is valid"));

/// 標準テンプレートと原文から抽出した値
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// `{0}`, `{1}`, ... を含む標準テンプレート
    pub template: String,
    /// 抽出した数値（出現順）
    pub values: Vec<String>,
}

/// `text` を標準テンプレートに変換する
///
/// `<...>` マークアップの外にある数値（`123`, `12.5`）を左から順に抽出する。
///
/// # Returns
/// - `None`: 抽出した値がない、波括弧を含む、または翻訳対象の文字が残らない
#[must_use]
pub fn normalize(text: &str) -> Option<Normalized> {
    if text.contains(['{', '}']) {
        return None;
    }

    let mut template = String::with_capacity(text.len());
    let mut values: Vec<String> = Vec::new();
    let mut number = String::new();
    let mut in_markup = false;
    let mut has_letter = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_markup {
            template.push(c);
            in_markup = c != '>';
            continue;
        }

        if c.is_ascii_digit() {
            number.push(c);
            let continues_decimal = chars.peek() == Some(&'.')
                && !number.contains('.')
                && chars.clone().nth(1).is_some_and(|next| next.is_ascii_digit());
            if continues_decimal {
                number.push('.');
                chars.next();
            }
            if !chars.peek().is_some_and(char::is_ascii_digit) {
                template.push_str(&format!("{{{}}}", values.len()));
                values.push(std::mem::take(&mut number));
            }
            continue;
        }

        if c == '<' {
            in_markup = true;
        } else if c.is_alphabetic() {
            has_letter = true;
        }
        template.push(c);
    }

    (!values.is_empty() && has_letter).then_some(Normalized { template, values })
}

/// 翻訳テンプレートに `values` を埋め込む
///
/// # Returns
/// - `None`: 存在しない値を参照している、または結果が空
#[must_use]
pub fn merge(template: &str, values: &[String]) -> Option<String> {
    let mut merged = String::with_capacity(template.len());
    let mut cursor = 0;

    for captures in TEMPLATE_PLACEHOLDER.captures_iter(template) {
        let whole = captures.get(0)?;
        let index: usize = captures.get(1)?.as_str().parse().ok()?;
        merged.push_str(template.get(cursor..whole.start())?);
        merged.push_str(values.get(index)?);
        cursor = whole.end();
    }
    merged.push_str(template.get(cursor..)?);

    (!merged.is_empty()).then_some(merged)
}
