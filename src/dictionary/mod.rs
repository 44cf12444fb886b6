//! 翻訳辞書とその読み込み

/// 翻訳ファイルの探索
pub mod catalog;
/// 翻訳ソースの取り込み
pub mod loader;
/// メモリ上の辞書
mod store;
/// 読み込み時のエントリ変換
pub mod transforms;

pub use catalog::{
    CatalogError,
    find_translation_files,
};
pub use loader::{
    LoadError,
    LoadReport,
    Loader,
    insert_entry,
    link_tag_fragments,
};
pub use store::{
    Dictionary,
    Layer,
};
