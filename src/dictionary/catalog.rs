//! 翻訳ファイルの探索

use std::path::{
    Path,
    PathBuf,
};

use globset::{
    Glob,
    GlobSet,
    GlobSetBuilder,
};
use ignore::WalkBuilder;
use thiserror::Error;

/// 探索時のエラー
#[derive(Error, Debug)]
pub enum CatalogError {
    /// glob パターンが不正
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// 不正なパターン
        pattern: String,
        /// globset のエラーメッセージ
        message: String,
    },
}

/// `dir` 以下の翻訳ファイルを探す
///
/// パスは `dir` からの相対パスで照合する。読み込み順（後のファイルが上書き）を固定するため、
/// 結果はソートして返す。
///
/// # Arguments
/// * `dir` - 探索するディレクトリ（存在しない場合は空の結果）
/// * `include_pattern` - 対象ファイルの glob
/// * `exclude_patterns` - 除外する glob
///
/// # Errors
/// glob パターンが不正な場合
pub fn find_translation_files(
    dir: &Path,
    include_pattern: &str,
    exclude_patterns: &[String],
) -> Result<Vec<PathBuf>, CatalogError> {
    let include_set = build_glob_set(&[include_pattern.to_string()])?;
    let exclude_set = build_glob_set(exclude_patterns)?;

    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "Translation directory does not exist");
        return Ok(Vec::new());
    }

    let mut found_files = Vec::new();
    for result in WalkBuilder::new(dir)
        .hidden(true)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .follow_links(false)
        .build()
    {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(?err, "Failed to read directory entry");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.path();
        let Ok(relative_path) = path.strip_prefix(dir) else {
            continue;
        };
        if !include_set.is_match(relative_path) || exclude_set.is_match(relative_path) {
            continue;
        }

        found_files.push(path.to_path_buf());
    }

    found_files.sort();
    Ok(found_files)
}

/// glob パターンの一覧から `GlobSet` を構築する
///
/// # Errors
/// パターンが不正な場合
fn build_glob_set(patterns: &[String]) -> Result<GlobSet, CatalogError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| CatalogError::InvalidPattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| CatalogError::InvalidPattern {
        pattern: patterns.join(", "),
        message: e.to_string(),
    })
}
