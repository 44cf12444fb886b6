//! 文字列を部分ごとに翻訳するための分割処理

/// フラグ文字による分割
mod flags;
/// マークアップの組による分割
mod tags;

pub use flags::{
    Piece,
    SplitStatus,
    SplitTranslation,
    segment_by_flags,
    translate_fragments,
};
pub use tags::split_by_tags;
