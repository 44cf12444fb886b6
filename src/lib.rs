//! text-localizer
//!
//! 実行時テキストローカライズエンジン
//!
//! 画面上の原文をロケールごとの翻訳辞書に対して段階的な照合戦略で解決し、
//! 未翻訳の文字列を翻訳作業用に記録する。

/// 値判定・区切り文字の文字クラス
pub mod charset;
/// デバッグコマンド
pub mod commands;
/// 設定
pub mod config;
/// 翻訳辞書
pub mod dictionary;
/// 未翻訳文字列のダンプ
pub mod dump;
/// ロケールエンジン
pub mod engine;
/// 書式の正規化
pub mod format;
/// テンプレートキーの正規表現ルール
pub mod pattern;
/// 段階的な解決処理
pub mod resolver;
/// テキスト分割
pub mod segment;
/// 共通の型
pub mod types;

/// テスト用ユーティリティ
#[cfg(test)]
mod test_utils;

pub use engine::{
    Engine,
    EngineError,
};
pub use types::Outcome;
