//! フラグ文字による分割
//!
//! 数字・符号・括弧などの「フラグ」文字とマークアップタグでテキストを区切る。
//! 区切りの間に残る部分が断片で、1 つずつ辞書を引く。

use std::collections::HashMap;

use crate::charset::{
    is_flag_char,
    is_pure_value,
};

/// 分割したテキストの 1 片
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    /// そのまま残す部分（マークアップ、フラグ文字、空白のみの並び）
    Literal(String),
    /// 翻訳対象の並び（前後の空白を含む）
    Fragment(String),
}

/// 断片ごとの翻訳の全体状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitStatus {
    /// 翻訳対象なし（マークアップ・フラグ文字・空白のみ）
    Empty,
    /// テキスト全体が 1 つの断片で分割できない
    Unsplittable,
    /// すべての断片を翻訳できた
    Full,
    /// 一部の断片を翻訳できた
    Part,
    /// どの断片も翻訳できなかった
    None,
}

/// [`translate_fragments`] の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitTranslation {
    /// 全体状態
    pub status: SplitStatus,
    /// 翻訳できた断片を置き換えたテキスト（未翻訳の断片はそのまま）
    pub text: String,
    /// 翻訳が見つからなかった断片（前後の空白を除去、出現順）
    pub unresolved: Vec<String>,
}

/// `text` をそのまま残す部分と断片に分割する
///
/// Unicode スカラー値単位で処理する。`<` から次の `>` まではマークアップで、
/// 閉じていないタグはテキスト末尾まで続く。
#[must_use]
pub fn segment_by_flags(text: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut markup: Option<String> = None;

    for c in text.chars() {
        if let Some(tag) = markup.as_mut() {
            tag.push(c);
            if c == '>'
                && let Some(tag) = markup.take()
            {
                pieces.push(Piece::Literal(tag));
            }
            continue;
        }

        if c == '<' {
            flush(&mut current, &mut pieces);
            markup = Some(String::from(c));
        } else if is_flag_char(c) {
            flush(&mut current, &mut pieces);
            pieces.push(Piece::Literal(String::from(c)));
        } else {
            current.push(c);
        }
    }

    if let Some(tag) = markup {
        flush(&mut current, &mut pieces);
        pieces.push(Piece::Literal(tag));
    }
    flush(&mut current, &mut pieces);

    merge_literals(pieces)
}

/// 蓄積中の並びを確定する（空白のみなら `Literal`、それ以外は `Fragment`）
fn flush(current: &mut String, pieces: &mut Vec<Piece>) {
    if current.is_empty() {
        return;
    }
    let run = std::mem::take(current);
    if run.trim().is_empty() {
        pieces.push(Piece::Literal(run));
    } else {
        pieces.push(Piece::Fragment(run));
    }
}

/// 連続する `Literal` を 1 つにまとめる
fn merge_literals(pieces: Vec<Piece>) -> Vec<Piece> {
    let mut merged: Vec<Piece> = Vec::with_capacity(pieces.len());
    for piece in pieces {
        match (merged.last_mut(), piece) {
            (Some(Piece::Literal(previous)), Piece::Literal(next)) => previous.push_str(&next),
            (_, piece) => merged.push(piece),
        }
    }
    merged
}

/// `fragments` を使って `text` を断片ごとに翻訳する
///
/// 検索では前後の空白を無視し、結果の前後には元の空白を残す。
/// 翻訳結果の全角カンマは、置き換えると純粋な値になる場合に `,` にする。
#[must_use]
#[allow(clippy::implicit_hasher)]
pub fn translate_fragments(text: &str, fragments: &HashMap<String, String>) -> SplitTranslation {
    let pieces = segment_by_flags(text);
    let fragment_count = pieces.iter().filter(|p| matches!(p, Piece::Fragment(_))).count();

    if fragment_count == 0 {
        return SplitTranslation {
            status: SplitStatus::Empty,
            text: text.to_string(),
            unresolved: Vec::new(),
        };
    }
    if let [Piece::Fragment(only)] = pieces.as_slice()
        && only == text
    {
        return SplitTranslation {
            status: SplitStatus::Unsplittable,
            text: text.to_string(),
            unresolved: Vec::new(),
        };
    }

    let mut translated = String::with_capacity(text.len());
    let mut unresolved = Vec::new();
    for piece in &pieces {
        match piece {
            Piece::Literal(literal) => translated.push_str(literal),
            Piece::Fragment(fragment) => {
                let trimmed = fragment.trim();
                if let Some(value) = fragments.get(trimmed) {
                    let (leading, trailing) = surrounding_whitespace(fragment);
                    translated.push_str(leading);
                    translated.push_str(&normalize_comma(value));
                    translated.push_str(trailing);
                } else {
                    translated.push_str(fragment);
                    unresolved.push(trimmed.to_string());
                }
            }
        }
    }

    let status = if unresolved.is_empty() {
        SplitStatus::Full
    } else if unresolved.len() < fragment_count {
        SplitStatus::Part
    } else {
        SplitStatus::None
    };

    SplitTranslation { status, text: translated, unresolved }
}

/// 断片の前後の空白を返す
fn surrounding_whitespace(fragment: &str) -> (&str, &str) {
    let start = fragment.len() - fragment.trim_start().len();
    let end = fragment.trim_end().len();
    (
        fragment.get(..start).unwrap_or_default(),
        fragment.get(end..).unwrap_or_default(),
    )
}

/// 純粋な値になる場合だけ全角カンマを `,` に置き換える
fn normalize_comma(value: &str) -> String {
    if value.contains('，') {
        let normalized = value.replace('，', ",");
        if is_pure_value(&normalized) {
            return normalized;
        }
    }
    value.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;

    fn fragments(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[rstest]
    fn segments_on_flags_and_markup() {
        let pieces = segment_by_flags("Deal <b>6</b> damage");

        assert_that!(
            pieces,
            elements_are![
                eq(&Piece::Fragment("Deal ".to_string())),
                eq(&Piece::Literal("<b>6</b>".to_string())),
                eq(&Piece::Fragment(" damage".to_string())),
            ]
        );
    }

    #[rstest]
    fn multibyte_flags_split() {
        let pieces = segment_by_flags("攻撃力＋10【火】");

        assert_that!(
            pieces,
            elements_are![
                eq(&Piece::Fragment("攻撃力".to_string())),
                eq(&Piece::Literal("＋10【".to_string())),
                eq(&Piece::Fragment("火".to_string())),
                eq(&Piece::Literal("】".to_string())),
            ]
        );
    }

    #[rstest]
    fn full_translation_keeps_whitespace() {
        let dict = fragments(&[("Deal", "造成"), ("damage", "伤害")]);

        let result = translate_fragments("Deal 6 damage", &dict);

        assert_that!(result.status, eq(SplitStatus::Full));
        assert_that!(result.text, eq("造成 6 伤害"));
        assert_that!(result.unresolved, is_empty());
    }

    #[rstest]
    fn partial_translation_reports_unresolved() {
        let dict = fragments(&[("Deal", "造成")]);

        let result = translate_fragments("Deal 6 fire damage", &dict);

        assert_that!(result.status, eq(SplitStatus::Part));
        assert_that!(result.text, eq("造成 6 fire damage"));
        assert_that!(result.unresolved, elements_are![eq("fire damage")]);
    }

    #[rstest]
    fn no_fragment_resolved() {
        let result = translate_fragments("Deal 6 damage", &HashMap::new());

        assert_that!(result.status, eq(SplitStatus::None));
        assert_that!(result.unresolved, elements_are![eq("Deal"), eq("damage")]);
    }

    #[rstest]
    #[case::numbers("12:30")]
    #[case::markup_only("<b>100</b>")]
    #[case::empty("")]
    #[case::whitespace_and_flags(" + 5 ")]
    fn nothing_to_translate(#[case] text: &str) {
        assert_that!(translate_fragments(text, &HashMap::new()).status, eq(SplitStatus::Empty));
    }

    #[rstest]
    fn whole_text_is_one_fragment() {
        let dict = fragments(&[("Hello", "你好")]);

        let result = translate_fragments("Hello", &dict);

        assert_that!(result.status, eq(SplitStatus::Unsplittable));
    }

    #[rstest]
    fn fullwidth_comma_normalized_only_for_pure_values() {
        let dict = fragments(&[("Gold", "1，000"), ("Silver", "银，币")]);

        assert_that!(translate_fragments("Gold: 5", &dict).text, eq("1,000: 5"));
        assert_that!(translate_fragments("Silver: 5", &dict).text, eq("银，币: 5"));
    }

    #[rstest]
    fn unterminated_markup_is_literal() {
        let dict = fragments(&[("Name", "名字")]);

        let result = translate_fragments("Name: <color=red", &dict);

        assert_that!(result.status, eq(SplitStatus::Full));
        assert_that!(result.text, eq("名字: <color=red"));
    }
}
