//! テスト用ユーティリティ関数
//!
//! 複数のテストモジュールで使用される共通のヘルパー関数を提供します。
#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::Path;

use crate::dictionary::{
    Dictionary,
    Layer,
    insert_entry,
};
use crate::engine::Engine;

/// `exact` に指定のエントリを持つ辞書を作成する
///
/// テンプレートキー（`{` を含むキー）は正規表現ルールも生成される。
pub(crate) fn dictionary_with(pairs: &[(&str, &str)]) -> Dictionary {
    let mut dictionary = Dictionary::new();
    for (key, value) in pairs {
        insert_entry(&mut dictionary, Layer::Exact, (*key).to_string(), (*value).to_string());
    }
    dictionary
}

/// `root` からの相対パスにファイルを書き込む（親ディレクトリも作成）
pub(crate) fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// `root` の設定と翻訳ファイルから Engine を作成する
pub(crate) fn open_engine(root: &Path) -> Engine {
    Engine::open(Some(root.to_path_buf())).unwrap()
}
