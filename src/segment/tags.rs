//! マークアップの組による分割

use std::sync::LazyLock;

use regex::Regex;

use crate::charset::is_pure_value;

/// `<open>inner</close>`（最短一致、閉じタグの名前は一致しなくてよい）
#[allow(clippy::expect_used)]
static TAG_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>(.*?)</[^>]*>").expect("tag pair regex is valid"));

/// 内側が純粋な値のタグの組で `text` を分割する
///
/// 採用した組ごとに、直前の組との間のテキストを 1 要素とし、最後の組より後ろの残りで終わる。
/// 内側に翻訳対象を含む組は読み飛ばす。
///
/// # Returns
/// 分割結果（採用した組がない場合は空）
///
/// # Examples
/// ```
/// use text_localizer::segment::split_by_tags;
///
/// let parts = split_by_tags("Deal <color=red>6</color> damage");
/// assert_eq!(parts, vec!["Deal ", " damage"]);
///
/// assert!(split_by_tags("<color=red>ABC</color>").is_empty());
/// ```
#[must_use]
pub fn split_by_tags(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut last_end = 0;
    let mut accepted = false;

    for captures in TAG_PAIR.captures_iter(text) {
        let (Some(whole), Some(inner)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        if !is_pure_value(inner.as_str()) {
            continue;
        }
        parts.push(text.get(last_end..whole.start()).unwrap_or_default());
        last_end = whole.end();
        accepted = true;
    }

    if accepted {
        parts.push(text.get(last_end..).unwrap_or_default());
    }
    parts
}
