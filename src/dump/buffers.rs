//! 書き出し待ちの文字列を記録順に保持するバッファ

use std::collections::HashSet;

use crate::types::DumpKind;

/// ダンプバッファ 1 つ分
///
/// 書き出し待ちの間だけ重複を排除する。書き出した文字列は `seen` からも取り除くため、
/// 保持するのは書き出し待ちの文字列だけになる。
#[derive(Debug, Default, Clone)]
pub struct DumpBuffer {
    /// 書き出し待ちの文字列（記録順）
    pending: Vec<String>,
    /// `pending` と同じ内容の集合（重複判定用）
    seen: HashSet<String>,
}

impl DumpBuffer {
    /// 書き出し待ちでなければ `text` を追加する
    ///
    /// # Returns
    /// 追加した場合は `true`
    pub fn record(&mut self, text: &str) -> bool {
        if self.seen.contains(text) {
            return false;
        }
        self.seen.insert(text.to_string());
        self.pending.push(text.to_string());
        true
    }

    /// 書き出し待ちの文字列
    #[must_use]
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    /// 書き出し待ちがないか判定する
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// 書き出し済みの先頭 `count` 件を取り除く
    ///
    /// 追加は末尾にだけ行うため、以前のスナップショットの内容は常に先頭部分になる。
    pub fn drain_flushed(&mut self, count: usize) {
        let count = count.min(self.pending.len());
        for text in self.pending.drain(..count) {
            self.seen.remove(&text);
        }
    }

    /// 重複判定用に保持している文字列の数
    #[must_use]
    pub fn tracked_len(&self) -> usize {
        self.seen.len()
    }
}

/// 4 種類のダンプバッファ
#[derive(Debug, Default, Clone)]
pub struct DumpBuffers {
    /// [`DumpKind::Default`] 用
    default: DumpBuffer,
    /// [`DumpKind::SplitOrigin`] 用
    split_origin: DumpBuffer,
    /// [`DumpKind::SplitFragment`] 用
    split_fragment: DumpBuffer,
    /// [`DumpKind::Format`] 用
    format: DumpBuffer,
}

impl DumpBuffers {
    /// `kind` のバッファを返す
    #[must_use]
    pub const fn buffer(&self, kind: DumpKind) -> &DumpBuffer {
        match kind {
            DumpKind::Default => &self.default,
            DumpKind::SplitOrigin => &self.split_origin,
            DumpKind::SplitFragment => &self.split_fragment,
            DumpKind::Format => &self.format,
        }
    }

    /// `kind` のバッファを可変参照で返す
    pub const fn buffer_mut(&mut self, kind: DumpKind) -> &mut DumpBuffer {
        match kind {
            DumpKind::Default => &mut self.default,
            DumpKind::SplitOrigin => &mut self.split_origin,
            DumpKind::SplitFragment => &mut self.split_fragment,
            DumpKind::Format => &mut self.format,
        }
    }

    /// `kind` のバッファに `text` を記録する
    pub fn record(&mut self, kind: DumpKind, text: &str) -> bool {
        self.buffer_mut(kind).record(text)
    }

    /// 書き出し用に空でないバッファを複製する
    #[must_use]
    pub fn snapshot(&self) -> Vec<(DumpKind, Vec<String>)> {
        DumpKind::ALL
            .into_iter()
            .map(|kind| (kind, self.buffer(kind).pending().to_vec()))
            .filter(|(_, entries)| !entries.is_empty())
            .collect()
    }

    /// 全バッファの書き出し待ちの合計件数
    #[must_use]
    pub fn pending_len(&self) -> usize {
        DumpKind::ALL.into_iter().map(|kind| self.buffer(kind).pending().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;

    use super::*;

    #[googletest::test]
    fn record_deduplicates() {
        let mut buffers = DumpBuffers::default();

        expect_that!(buffers.record(DumpKind::Default, "Unknown Text"), eq(true));
        expect_that!(buffers.record(DumpKind::Default, "Unknown Text"), eq(false));
        expect_that!(buffers.record(DumpKind::Format, "Unknown Text"), eq(true));
        expect_that!(buffers.pending_len(), eq(2));
    }

    #[googletest::test]
    fn drained_entries_are_forgotten() {
        let mut buffers = DumpBuffers::default();
        buffers.record(DumpKind::Default, "a");
        buffers.record(DumpKind::Default, "b");

        buffers.buffer_mut(DumpKind::Default).drain_flushed(1);

        expect_that!(buffers.buffer(DumpKind::Default).pending(), elements_are![eq("b")]);
        expect_that!(buffers.buffer(DumpKind::Default).tracked_len(), eq(1));
        expect_that!(buffers.record(DumpKind::Default, "b"), eq(false));
        expect_that!(buffers.record(DumpKind::Default, "a"), eq(true));
    }

    #[googletest::test]
    fn tracked_strings_do_not_outlive_flushes() {
        let mut buffer = DumpBuffer::default();

        for round in 0..100 {
            for line in 0..10 {
                buffer.record(&format!("line {round}-{line}"));
            }
            let flushed = buffer.pending().len();
            buffer.drain_flushed(flushed);
        }

        expect_that!(buffer.tracked_len(), eq(0));
        expect_that!(buffer.is_empty(), eq(true));
    }

    #[googletest::test]
    fn snapshot_skips_empty_buffers() {
        let mut buffers = DumpBuffers::default();
        buffers.record(DumpKind::SplitFragment, "fire");

        let snapshot = buffers.snapshot();

        expect_that!(snapshot.len(), eq(1));
        expect_that!(snapshot.first().map(|(kind, _)| *kind), some(eq(DumpKind::SplitFragment)));
    }
}
