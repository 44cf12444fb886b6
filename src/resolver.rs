//! 段階的な解決処理
//!
//! 戦略を固定の順序で試し、最初に成功したものを採用する:
//! 1. `exact`
//! 2. `secondary`
//! 3. 翻訳済みの判定
//! 4. 末尾の `+` の正規化
//! 5. 正規化テンプレート
//! 6. 正規表現ルール
//! 7. フラグ文字による分割
//!
//! ダンプが接続されていれば、未翻訳と部分翻訳の文字列を記録する。

use crate::charset::is_pure_value;
use crate::dictionary::Dictionary;
use crate::dump::DumpSink;
use crate::format;
use crate::pattern::RuleMatch;
use crate::segment::{
    SplitStatus,
    translate_fragments,
};
use crate::types::{
    DumpKind,
    Outcome,
};

/// 辞書に対して原文を解決する（呼び出しごとに作成してよい）
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    /// 参照する辞書
    dictionary: &'a Dictionary,
    /// 未翻訳の記録先
    dump: Option<&'a DumpSink>,
}

impl<'a> Resolver<'a> {
    /// Resolver を作成する
    #[must_use]
    pub const fn new(dictionary: &'a Dictionary, dump: Option<&'a DumpSink>) -> Self {
        Self { dictionary, dump }
    }

    /// `text` を解決する（I/O を待たず、失敗しない）
    #[must_use]
    pub fn resolve(&self, text: &str) -> Outcome {
        let dictionary = self.dictionary;

        if let Some(translated) = dictionary.exact.get(text) {
            return Outcome::Translated(translated.clone());
        }
        if let Some(translated) = dictionary.secondary.get(text) {
            return Outcome::Translated(translated.clone());
        }
        if dictionary.translated.contains(text) {
            tracing::trace!(text, "Already translated");
            return Outcome::NotFound;
        }

        if let Some(translated) = self.resolve_trailing_plus(text) {
            return Outcome::Translated(translated);
        }
        if let Some(translated) = self.resolve_format(text) {
            return Outcome::Translated(translated);
        }
        if let Some(translated) = self.resolve_regex(text) {
            return Outcome::Translated(translated);
        }

        self.resolve_split(text)
    }

    /// `"Card A++"` を `exact["Card A"] + "++"` として解決する
    fn resolve_trailing_plus(&self, text: &str) -> Option<String> {
        let stripped = text.trim_end_matches('+');
        let plus_count = text.len() - stripped.len();
        if plus_count == 0 || stripped.is_empty() {
            return None;
        }

        let translated = self.dictionary.exact.get(stripped)?;
        Some(format!("{translated}{}", "+".repeat(plus_count)))
    }

    /// 正規化テンプレートで解決する（テンプレートがなければ Format ダンプに記録）
    fn resolve_format(&self, text: &str) -> Option<String> {
        let normalized = format::normalize(text)?;
        let Some(template) = self.dictionary.format_normalized.get(&normalized.template) else {
            self.record(DumpKind::Format, &normalized.template);
            return None;
        };

        let merged = format::merge(template, &normalized.values);
        if merged.is_none() {
            tracing::debug!(template = %normalized.template, "Format merge failed");
        }
        merged
    }

    /// 正規表現ルールを挿入順に評価する
    fn resolve_regex(&self, text: &str) -> Option<String> {
        for rule in &self.dictionary.regex_rules {
            match rule.evaluate(text) {
                RuleMatch::Matched(translated) => {
                    tracing::trace!(key = rule.key(), "Regex rule matched");
                    return Some(translated);
                }
                RuleMatch::NoMatch => {}
                RuleMatch::Failed => {
                    tracing::debug!(key = rule.key(), "Regex rule failed to evaluate; skipping");
                }
            }
        }
        None
    }

    /// フラグ文字で分割して断片ごとに解決する
    fn resolve_split(&self, text: &str) -> Outcome {
        let split = translate_fragments(text, &self.dictionary.split_fragments);

        match split.status {
            SplitStatus::Full => {
                self.record(DumpKind::SplitOrigin, text);
                Outcome::Translated(split.text)
            }
            SplitStatus::Empty => Outcome::NotFound,
            SplitStatus::Unsplittable => {
                self.record(DumpKind::Default, text);
                Outcome::NotFound
            }
            SplitStatus::Part | SplitStatus::None => {
                for fragment in &split.unresolved {
                    self.record(DumpKind::SplitFragment, fragment);
                }
                self.record(DumpKind::SplitOrigin, text);

                if split.status == SplitStatus::Part {
                    Outcome::Translated(split.text)
                } else {
                    Outcome::NotFound
                }
            }
        }
    }

    /// ダンプに記録する（翻訳対象を含まない文字列は記録しない）
    fn record(&self, kind: DumpKind, text: &str) {
        let Some(dump) = self.dump else {
            return;
        };
        if text.trim().is_empty() || is_pure_value(text) {
            return;
        }
        dump.record(kind, text);
    }
}
