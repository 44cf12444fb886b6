//! 1 ロケール分のメモリ上の翻訳辞書

use std::collections::{
    HashMap,
    HashSet,
};

use crate::pattern::RegexRule;

/// 翻訳ソースの格納先辞書
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// 完全一致辞書
    Exact,
    /// 補助辞書
    Secondary,
    /// 断片辞書
    SplitFragments,
    /// 正規化テンプレート辞書
    FormatNormalized,
}

/// 5 種類の翻訳辞書と既知の翻訳結果の集合
#[derive(Debug, Default, Clone)]
pub struct Dictionary {
    /// 原文 → 翻訳（最優先）
    pub exact: HashMap<String, String>,
    /// `exact` の次に参照する別系統の辞書
    pub secondary: HashMap<String, String>,
    /// 原文の断片 → 翻訳の断片
    pub split_fragments: HashMap<String, String>,
    /// 標準テンプレート → 翻訳テンプレート
    pub format_normalized: HashMap<String, String>,
    /// 挿入順に評価し、最初に一致したルールを採用する
    pub regex_rules: Vec<RegexRule>,
    /// 翻訳済みであることが分かっている文字列
    pub translated: HashSet<String>,
}

impl Dictionary {
    /// 空の辞書を作成する
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `layer` にエントリを追加する（後から追加したものが上書きする）
    ///
    /// `Exact` と `Secondary` の値は翻訳結果として記録する。
    pub fn insert(&mut self, layer: Layer, key: String, value: String) {
        match layer {
            Layer::Exact => {
                self.translated.insert(value.clone());
                self.exact.insert(key, value);
            }
            Layer::Secondary => {
                self.translated.insert(value.clone());
                self.secondary.insert(key, value);
            }
            Layer::SplitFragments => {
                self.split_fragments.insert(key, value);
            }
            Layer::FormatNormalized => {
                self.format_normalized.insert(key, value);
            }
        }
    }

    /// 正規表現ルールを末尾に追加する
    pub fn push_rule(&mut self, rule: RegexRule) {
        self.regex_rules.push(rule);
    }

    /// すべての辞書を空にする
    pub fn clear(&mut self) {
        self.exact.clear();
        self.secondary.clear();
        self.split_fragments.clear();
        self.format_normalized.clear();
        self.regex_rules.clear();
        self.translated.clear();
    }

    /// 全辞書のエントリ数（ルールを含む）
    #[must_use]
    pub fn len(&self) -> usize {
        self.exact.len()
            + self.secondary.len()
            + self.split_fragments.len()
            + self.format_normalized.len()
            + self.regex_rules.len()
    }

    /// エントリが 1 つもないか判定する
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;

    use super::*;

    #[googletest::test]
    fn insert_records_translation_outputs() {
        let mut dictionary = Dictionary::new();

        dictionary.insert(Layer::Exact, "Hello".to_string(), "你好".to_string());
        dictionary.insert(Layer::Secondary, "Bye".to_string(), "再见".to_string());
        dictionary.insert(Layer::SplitFragments, "Deal".to_string(), "造成".to_string());

        expect_that!(dictionary.translated.contains("你好"), eq(true));
        expect_that!(dictionary.translated.contains("再见"), eq(true));
        expect_that!(dictionary.translated.contains("造成"), eq(false));
        expect_that!(dictionary.len(), eq(3));
    }

    #[googletest::test]
    fn later_insert_overwrites() {
        let mut dictionary = Dictionary::new();

        dictionary.insert(Layer::Exact, "Hello".to_string(), "你好".to_string());
        dictionary.insert(Layer::Exact, "Hello".to_string(), "您好".to_string());

        expect_that!(dictionary.exact.get("Hello"), some(eq(&"您好".to_string())));
        expect_that!(dictionary.exact.len(), eq(1));
    }

    #[googletest::test]
    fn clear_empties_everything() {
        let mut dictionary = Dictionary::new();
        dictionary.insert(Layer::Exact, "Hello".to_string(), "你好".to_string());
        dictionary.push_rule(RegexRule::from_pattern("x", "y").unwrap());

        dictionary.clear();

        expect_that!(dictionary.is_empty(), eq(true));
        expect_that!(dictionary.translated, is_empty());
    }
}
