//! 分割処理とダンプのフィルタで共有する文字クラス

/// 単独では翻訳対象の内容を持たない文字
///
/// これらだけからなる文字列（`"12:30"`, `"+15%"`, `"3 x 4"` など）を「純粋な値」と呼ぶ。
pub const PURE_VALUE_CHARS: &[char] =
    &['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', ':', '/', ' ', '.', '%', ',', '+', '-', 'x', '\n'];

/// フラグ文字分割でテキストを断片に分ける文字
pub const FLAG_CHARS: &[char] = &[
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '+', '-', '%', '＋', '－', '％', '【', '】', '.',
    ':', '：', '×',
];

/// `c` が純粋な値の文字か判定する
#[must_use]
pub fn is_pure_value_char(c: char) -> bool {
    PURE_VALUE_CHARS.contains(&c)
}

/// `text` が空でなく、純粋な値の文字だけからなるか判定する
#[must_use]
pub fn is_pure_value(text: &str) -> bool {
    !text.is_empty() && text.chars().all(is_pure_value_char)
}

/// `c` がフラグ文字分割の区切りか判定する
#[must_use]
pub fn is_flag_char(c: char) -> bool {
    FLAG_CHARS.contains(&c)
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;

    #[rstest]
    #[case::digits("100")]
    #[case::time("12:30")]
    #[case::percent("+15%")]
    #[case::ratio("3 x 4")]
    #[case::date("2024/01/02")]
    #[case::multiline("1\n2")]
    #[case::thousands("1,000.5")]
    fn pure_values(#[case] text: &str) {
        assert_that!(is_pure_value(text), eq(true));
    }

    #[rstest]
    #[case::empty("")]
    #[case::letters("ABC")]
    #[case::mixed("Lv.10")]
    #[case::fullwidth_comma("1，000")]
    #[case::uppercase_x("3 X 4")]
    fn impure_values(#[case] text: &str) {
        assert_that!(is_pure_value(text), eq(false));
    }

    #[rstest]
    fn flag_chars_cover_fullwidth_variants() {
        for c in ['＋', '－', '％', '：', '【', '】', '×'] {
            assert_that!(is_flag_char(c), eq(true));
        }
        assert_that!(is_flag_char('a'), eq(false));
        assert_that!(is_flag_char(' '), eq(false));
        assert_that!(is_flag_char('，'), eq(false));
    }
}
