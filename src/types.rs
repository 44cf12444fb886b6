//! プロジェクト全体で使用するコア型

/// 原文 1 つを解決した結果
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// 翻訳結果（分割されたテキストでは部分的な翻訳の場合もある）
    Translated(String),
    /// 翻訳なし（エラーではなく通常の結果）
    NotFound,
}

impl Outcome {
    /// [`Outcome::Translated`] か判定する
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Translated(_))
    }

    /// 翻訳テキストを返す
    #[must_use]
    pub fn translated(&self) -> Option<&str> {
        match self {
            Self::Translated(text) => Some(text),
            Self::NotFound => None,
        }
    }

    /// ホスト向けの `(found, translated)` の組に変換する
    ///
    /// 翻訳がない場合は原文をそのまま返す。
    #[must_use]
    pub fn into_pair(self, source: &str) -> (bool, String) {
        match self {
            Self::Translated(text) => (true, text),
            Self::NotFound => (false, source.to_string()),
        }
    }
}

/// 記録した文字列の振り分け先ダンプバッファ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DumpKind {
    /// すべての戦略で見つからなかった文字列全体
    Default,
    /// フラグ文字分割で分割できた文字列全体
    SplitOrigin,
    /// 分割翻訳が見つからなかった個々の断片
    SplitFragment,
    /// 書式の正規化で生成した標準テンプレート
    Format,
}

impl DumpKind {
    /// 全種別（書き出し順）
    pub const ALL: [Self; 4] = [Self::Default, Self::SplitOrigin, Self::SplitFragment, Self::Format];
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::found(Outcome::Translated("你好".to_string()), (true, "你好"))]
    #[case::not_found(Outcome::NotFound, (false, "Hello"))]
    fn into_pair(#[case] outcome: Outcome, #[case] expected: (bool, &str)) {
        let (found, text) = outcome.into_pair("Hello");

        assert_that!(found, eq(expected.0));
        assert_that!(text, eq(expected.1));
    }

    #[rstest]
    fn translated_accessor() {
        assert_that!(Outcome::Translated("x".to_string()).translated(), some(eq("x")));
        assert_that!(Outcome::NotFound.translated(), none());
        assert_that!(Outcome::NotFound.is_found(), eq(false));
    }
}
