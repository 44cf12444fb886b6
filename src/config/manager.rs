//! 設定管理を行うモジュール

use std::path::{
    Path,
    PathBuf,
};

use super::{
    ConfigError,
    EngineSettings,
    loader,
};

/// 設定管理を行う
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// 現在の設定
    current_settings: EngineSettings,

    /// 設定のルートディレクトリ（相対パスの基準）
    root: Option<PathBuf>,
}

impl ConfigManager {
    /// 新しい設定マネージャーを作成
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: EngineSettings::default(), root: None }
    }

    /// 設定を読み込む
    ///
    /// # Arguments
    /// * `root` - 設定のルートディレクトリ
    ///
    /// # Returns
    /// - `Ok(())`: 設定の読み込みとバリデーション成功
    /// - `Err(ConfigError)`: エラー
    ///
    /// # Errors
    /// - ファイル読み込みエラー
    /// - JSON パースエラー
    /// - バリデーションエラー
    pub fn load_settings(&mut self, root: Option<PathBuf>) -> Result<(), ConfigError> {
        tracing::debug!("Loading settings for root: {:?}", root);

        // ルートの設定を読み込み
        let settings = if let Some(root) = &root {
            loader::load_from_root(root)?.map_or_else(EngineSettings::default, |loaded| {
                tracing::debug!("Loaded settings: {:?}", loaded);
                loaded
            })
        } else {
            EngineSettings::default()
        };

        // バリデーション
        settings.validate().map_err(ConfigError::ValidationErrors)?;

        // 設定を保存
        self.current_settings = settings;
        self.root = root;
        tracing::debug!("Settings loaded successfully: {:?}", self.current_settings);

        Ok(())
    }

    /// 設定を更新する（ロケール切り替えなど）
    pub fn update_settings(&mut self, new_settings: EngineSettings) -> Result<(), ConfigError> {
        tracing::debug!("Updating settings...");

        // バリデーション
        new_settings.validate().map_err(ConfigError::ValidationErrors)?;

        // 設定を更新
        self.current_settings = new_settings;
        tracing::debug!("Settings updated successfully");

        Ok(())
    }

    /// 現在の設定を取得
    #[must_use]
    pub const fn get_settings(&self) -> &EngineSettings {
        &self.current_settings
    }

    /// ルートディレクトリを取得
    #[must_use]
    pub const fn root(&self) -> Option<&PathBuf> {
        self.root.as_ref()
    }

    /// ルートからの相対パスを解決する（絶対パスはそのまま）
    #[must_use]
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// 指定ロケールの翻訳ディレクトリ
    #[must_use]
    pub fn locale_dir(&self, locale: &str) -> PathBuf {
        self.resolve_path(&self.current_settings.translation_root).join(locale)
    }

    /// ダンプ出力ディレクトリ
    #[must_use]
    pub fn dump_dir(&self) -> PathBuf {
        self.resolve_path(&self.current_settings.dump.directory)
    }
}
