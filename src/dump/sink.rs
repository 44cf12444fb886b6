//! ダンプバッファのデバウンス付き非同期書き出し

use std::path::{
    Path,
    PathBuf,
};
use std::sync::atomic::{
    AtomicBool,
    AtomicUsize,
    Ordering,
};
use std::sync::{
    Arc,
    Mutex,
    MutexGuard,
    PoisonError,
};
use std::time::Duration;

use serde_json::{
    Map,
    Value,
};
use thiserror::Error;
use tokio::runtime::Handle;

use super::buffers::DumpBuffers;
use crate::types::DumpKind;

/// 断片ダンプのキーと値の両方に付ける接頭辞
pub const SPLIT_FRAGMENT_MARKER: &str = "[SPLIT]";

/// ダンプ書き出し時のエラー
#[derive(Error, Debug)]
pub enum DumpError {
    /// ファイルの読み書きエラー
    #[error("Failed to access dump file: {0}")]
    Io(#[from] std::io::Error),

    /// 既存のダンプファイルのパースエラー
    #[error("Failed to parse dump file: {0}")]
    Parse(#[from] serde_json::Error),

    /// 既存のダンプファイルがオブジェクトでない
    #[error("Dump file is not a JSON object: {0}")]
    NotAnObject(PathBuf),
}

/// `kind` の書き出し先ファイル名（ページ番号を持つのは Default のみ）
#[must_use]
pub fn dump_file_name(kind: DumpKind, page: usize) -> String {
    match kind {
        DumpKind::Default => format!("dump_{page}.json"),
        DumpKind::SplitOrigin => "dump_split_origin.json".to_string(),
        DumpKind::SplitFragment => "dump_fragment_split.json".to_string(),
        DumpKind::Format => "dump_format.json".to_string(),
    }
}

/// 未翻訳の文字列を記録し、呼び出し元とは別のタスクでファイルに書き出す
///
/// 書き出し後に最初に記録されたエントリでデバウンスタイマーを 1 つだけ起動し、
/// 発火時に 4 種類のバッファをそれぞれのファイルにマージする。
/// 書き出し中に届いたエントリや書き出しに失敗したエントリは次のサイクルで書き出す。
#[derive(Clone)]
pub struct DumpSink {
    /// 書き出しタスクと共有する状態
    inner: Arc<SinkInner>,
}

/// `DumpSink` と書き出しタスクで共有する状態
struct SinkInner {
    /// 書き出し待ちのバッファ
    buffers: Mutex<DumpBuffers>,
    /// 書き出しタスクが起動済みの間 `true`
    scheduled: AtomicBool,
    /// Default ダンプの現在のページ
    page: AtomicUsize,
    /// 書き出す内容があったサイクルの数
    flushes: AtomicUsize,
    /// 書き出し先ディレクトリ
    directory: PathBuf,
    /// 最初の記録から書き出しまでの待ち時間
    debounce: Duration,
    /// タイマーによる書き出しと明示的な書き出しを直列化する
    flush_gate: tokio::sync::Mutex<()>,
    /// 書き出しタスクを起動するランタイム
    runtime: Handle,
}

impl std::fmt::Debug for DumpSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DumpSink")
            .field("directory", &self.inner.directory)
            .field("debounce", &self.inner.debounce)
            .field("page", &self.page())
            .field("scheduled", &self.inner.scheduled.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl DumpSink {
    /// `directory` 以下に書き出す DumpSink を作成する（書き出しタスクは `runtime` で実行）
    #[must_use]
    pub fn new(directory: PathBuf, debounce: Duration, runtime: Handle) -> Self {
        Self {
            inner: Arc::new(SinkInner {
                buffers: Mutex::new(DumpBuffers::default()),
                scheduled: AtomicBool::new(false),
                page: AtomicUsize::new(0),
                flushes: AtomicUsize::new(0),
                directory,
                debounce,
                flush_gate: tokio::sync::Mutex::new(()),
                runtime,
            }),
        }
    }

    /// `text` を `kind` のバッファに記録する（I/O を待たない）
    pub fn record(&self, kind: DumpKind, text: &str) {
        let appended = self.inner.lock_buffers().record(kind, text);
        if appended {
            tracing::trace!(?kind, text, "Recorded dump entry");
            self.inner.schedule();
        }
    }

    /// 書き出し待ちのエントリをすぐに書き出す
    ///
    /// # Returns
    /// 書き出したエントリ数
    ///
    /// # Errors
    /// サイクル中の最初の I/O またはパースの失敗（失敗したバッファはエントリを保持する）
    pub async fn flush_now(&self) -> Result<usize, DumpError> {
        self.inner.flush().await
    }

    /// Default ダンプファイルの現在のページ
    #[must_use]
    pub fn page(&self) -> usize {
        self.inner.page.load(Ordering::Acquire)
    }

    /// 以降の Default エントリの書き出し先を次のページにする
    pub fn next_page(&self) -> usize {
        let page = self.inner.page.fetch_add(1, Ordering::AcqRel).saturating_add(1);
        tracing::info!(page, "Dump page changed");
        page
    }

    /// 以降の Default エントリの書き出し先を前のページにする（0 未満にはならない）
    pub fn prev_page(&self) -> usize {
        let previous = self
            .inner
            .page
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |page| Some(page.saturating_sub(1)))
            .unwrap_or_else(|page| page);
        let page = previous.saturating_sub(1);
        tracing::info!(page, "Dump page changed");
        page
    }

    /// 現在のページでの `kind` の書き出し先
    #[must_use]
    pub fn file_path(&self, kind: DumpKind) -> PathBuf {
        self.inner.directory.join(dump_file_name(kind, self.page()))
    }

    /// 書き出す内容があったサイクルの数
    #[must_use]
    pub fn flush_count(&self) -> usize {
        self.inner.flushes.load(Ordering::Acquire)
    }

    /// 書き出し待ちの合計件数
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.inner.lock_buffers().pending_len()
    }

    /// 次の書き出しを待つ `kind` のエントリの複製
    #[must_use]
    pub fn pending(&self, kind: DumpKind) -> Vec<String> {
        self.inner.lock_buffers().buffer(kind).pending().to_vec()
    }
}

impl SinkInner {
    /// バッファをロックする（ポイズンされていても中身を使う）
    fn lock_buffers(&self) -> MutexGuard<'_, DumpBuffers> {
        self.buffers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 書き出しタスクが未起動ならデバウンス後に書き出すタスクを起動する
    ///
    /// 書き出し後もエントリが残っていれば次のタスクを起動する。
    fn schedule(self: &Arc<Self>) {
        if self.scheduled.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err()
        {
            return;
        }

        let inner = Arc::clone(self);
        self.runtime.spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            if let Err(error) = inner.flush().await {
                tracing::warn!(%error, "Dump flush failed; entries kept for the next cycle");
            }
            inner.scheduled.store(false, Ordering::Release);
            if inner.lock_buffers().pending_len() > 0 {
                inner.schedule();
            }
        });
    }

    /// 全バッファのスナップショットを書き出し、成功した分をバッファから取り除く
    async fn flush(&self) -> Result<usize, DumpError> {
        let _gate = self.flush_gate.lock().await;

        let snapshot = self.lock_buffers().snapshot();
        if snapshot.is_empty() {
            return Ok(0);
        }

        let page = self.page.load(Ordering::Acquire);
        let mut written = 0;
        let mut first_error = None;

        for (kind, entries) in snapshot {
            let path = self.directory.join(dump_file_name(kind, page));
            let marker = if kind == DumpKind::SplitFragment { SPLIT_FRAGMENT_MARKER } else { "" };
            match write_merged(&path, &entries, marker).await {
                Ok(()) => {
                    self.lock_buffers().buffer_mut(kind).drain_flushed(entries.len());
                    written += entries.len();
                    tracing::debug!(file = %path.display(), count = entries.len(), "Flushed dump entries");
                }
                Err(error) => {
                    tracing::warn!(file = %path.display(), %error, "Failed to write dump file");
                    first_error.get_or_insert(error);
                }
            }
        }

        self.flushes.fetch_add(1, Ordering::AcqRel);
        first_error.map_or(Ok(written), Err)
    }
}

/// `path` の JSON オブジェクトに `entries` を追加する（既存の値は保持）
async fn write_merged(path: &Path, entries: &[String], marker: &str) -> Result<(), DumpError> {
    let mut merged = read_existing(path).await?;
    for entry in entries {
        let key = format!("{marker}{entry}");
        merged.entry(key.clone()).or_insert(Value::String(key));
    }

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(&Value::Object(merged))?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// 既存のダンプファイルを読む（存在しない、または空なら空のオブジェクト）
async fn read_existing(path: &Path) -> Result<Map<String, Value>, DumpError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(error) => return Err(error.into()),
    };
    if content.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str::<Value>(&content)? {
        Value::Object(map) => Ok(map),
        _ => Err(DumpError::NotAnObject(path.to_path_buf())),
    }
}
