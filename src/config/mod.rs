//! エンジン設定（型、ファイル読み込み、検証）

/// 設定ファイルの読み込み
mod loader;
/// 設定の管理
mod manager;
/// 設定の型
mod types;

pub use loader::CONFIG_FILE_NAME;
pub use manager::ConfigManager;
pub use types::{
    ColorMarkup,
    ConfigError,
    DumpConfig,
    EngineSettings,
    ValidationError,
};
