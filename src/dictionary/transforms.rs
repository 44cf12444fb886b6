//! 読み込み時の翻訳エントリ変換

use std::collections::{
    BTreeMap,
    HashMap,
};
use std::sync::LazyLock;

use regex::Regex;

use crate::charset::is_pure_value;
use crate::config::ColorMarkup;
use crate::segment::split_by_tags;

/// 番号付きメンションマーカー（`[@1]` など）
#[allow(clippy::expect_used)]
static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[@\d+\]").expect("mention regex is valid"));

/// キーと値を `[@N]` で分割し、区間ごとに組にする
///
/// 空の区間は捨てる。
///
/// # Returns
/// - `None`: キーにマーカーがない、または区間数が一致しない（エントリは分割せずに追加される）
#[must_use]
pub fn split_mentions(key: &str, value: &str) -> Option<Vec<(String, String)>> {
    if !MENTION.is_match(key) {
        return None;
    }

    let key_segments: Vec<&str> = MENTION.split(key).collect();
    let value_segments: Vec<&str> = MENTION.split(value).collect();
    if key_segments.len() != value_segments.len() {
        return None;
    }

    Some(
        key_segments
            .into_iter()
            .zip(value_segments)
            .map(|(k, v)| (k.trim(), v.trim()))
            .filter(|(k, v)| !k.is_empty() && !v.is_empty())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

/// `$` で囲んだ強調表示を展開する
///
/// `"Gain $Block$"` から `"Gain Block"` と、設定のマークアップで囲んだ
/// `"Gain <color>Block</color>"` の 2 エントリを作る。
/// 色付きのエントリはキーと値の `$` がどちらも偶数個の場合だけ作る。
#[must_use]
pub fn expand_dollar_color(key: &str, value: &str, markup: &ColorMarkup) -> Vec<(String, String)> {
    if !key.contains('$') {
        return vec![(key.to_string(), value.to_string())];
    }

    let mut entries = vec![(key.replace('$', ""), value.replace('$', ""))];
    let balanced = |s: &str| s.matches('$').count() % 2 == 0;
    if balanced(key) && balanced(value) {
        entries.push((colorize(key, markup), colorize(value, markup)));
    }
    entries
}

/// `$` を開始・終了のマークアップに交互に置き換える
fn colorize(text: &str, markup: &ColorMarkup) -> String {
    let mut colored = String::with_capacity(text.len() + markup.open.len() + markup.close.len());
    let mut open = false;
    for c in text.chars() {
        if c == '$' {
            colored.push_str(if open { &markup.close } else { &markup.open });
            open = !open;
        } else {
            colored.push(c);
        }
    }
    colored
}

/// マークアップを含む `exact` のエントリから断片のエントリを導出する
///
/// `"Deal <b>6</b> damage" → "造成<b>6</b>伤害"` からは `"Deal" → "造成"` と
/// `"damage" → "伤害"` を導出する。`exact` に既にあるキーは上書きしない。
/// 同じ断片が複数のエントリから導出される場合は、キーのソート順で最初のエントリが採用される。
///
/// # Returns
/// 導出したエントリ（キー順）
#[must_use]
#[allow(clippy::implicit_hasher)]
pub fn cross_link_tags(exact: &HashMap<String, String>) -> Vec<(String, String)> {
    let mut sources: Vec<(&String, &String)> = exact.iter().collect();
    sources.sort_unstable();

    let mut links: BTreeMap<String, String> = BTreeMap::new();
    for (key, value) in sources {
        if !value.contains('<') || !key.contains('<') {
            continue;
        }
        let key_parts = split_by_tags(key);
        let value_parts = split_by_tags(value);
        if key_parts.is_empty() || key_parts.len() != value_parts.len() {
            continue;
        }

        for (k, v) in key_parts.into_iter().zip(value_parts) {
            let (k, v) = (k.trim(), v.trim());
            if k.is_empty() || v.is_empty() || is_pure_value(k) || exact.contains_key(k) {
                continue;
            }
            links.entry(k.to_string()).or_insert_with(|| v.to_string());
        }
    }

    links.into_iter().collect()
}
