//! 未翻訳の文字列を書き出すダンプ

/// 重複排除付きのダンプバッファ
mod buffers;
/// デバウンス付きのファイル書き出し
mod sink;

pub use buffers::{
    DumpBuffer,
    DumpBuffers,
};
pub use sink::{
    DumpError,
    DumpSink,
    SPLIT_FRAGMENT_MARKER,
    dump_file_name,
};
