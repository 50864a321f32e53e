//! 設定管理を行うモジュール

use std::path::{
    Path,
    PathBuf,
};

use super::{
    ConfigError,
    SourceConfig,
    TranslationSettings,
    loader,
};
use crate::source::{
    ArchiveSource,
    CachingLoader,
    DirectorySource,
    FanOutLoader,
    NetworkSource,
    RegistrySource,
    SourceHandle,
};
use crate::translator::TranslatorOptions;

/// 設定管理を行う
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// 現在の設定
    current_settings: TranslationSettings,

    /// ワークスペースのルートパス
    workspace_root: Option<PathBuf>,
}

impl ConfigManager {
    /// 新しい設定マネージャーを作成
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: TranslationSettings::default(), workspace_root: None }
    }

    /// 設定を読み込む
    ///
    /// # Arguments
    /// * `workspace_root` - ワークスペースのルートパス
    ///
    /// # Errors
    /// - ファイル読み込みエラー
    /// - JSON パースエラー
    /// - バリデーションエラー
    pub fn load_settings(&mut self, workspace_root: Option<PathBuf>) -> Result<(), ConfigError> {
        tracing::debug!("Loading settings for workspace: {:?}", workspace_root);

        let settings = if let Some(root) = &workspace_root {
            loader::load_from_workspace(root)?.map_or_else(TranslationSettings::default, |ws| {
                tracing::debug!("Loaded workspace settings: {:?}", ws);
                ws
            })
        } else {
            TranslationSettings::default()
        };

        settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = settings;
        self.workspace_root = workspace_root;
        tracing::debug!("Settings loaded successfully: {:?}", self.current_settings);

        Ok(())
    }

    /// 設定を更新する
    ///
    /// # Errors
    /// - バリデーションエラー
    pub fn update_settings(&mut self, new_settings: TranslationSettings) -> Result<(), ConfigError> {
        tracing::debug!("Updating settings...");

        new_settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = new_settings;
        tracing::debug!("Settings updated successfully");

        Ok(())
    }

    /// 現在の設定を取得
    #[must_use]
    pub const fn get_settings(&self) -> &TranslationSettings {
        &self.current_settings
    }

    /// ワークスペースルートを取得
    #[must_use]
    pub const fn workspace_root(&self) -> Option<&PathBuf> {
        self.workspace_root.as_ref()
    }

    /// Translator の生成オプションを取得
    #[must_use]
    pub fn translator_options(&self) -> TranslatorOptions {
        TranslatorOptions {
            default_locale: self.current_settings.default_locale.clone(),
            fallback_date_format: self.current_settings.fallback_date_format.clone(),
        }
    }

    /// 設定からトップレベルのソースを組み立てる
    ///
    /// - `cache` が有効なら設定済みソースを [`CachingLoader`] に、無効なら
    ///   [`FanOutLoader`] に登録する
    /// - `includeRegistry` が有効ならグローバルレジストリを最後に追加する
    ///   (レジストリはキャッシュしない)
    ///
    /// # Errors
    /// - 除外パターンが不正な場合
    pub fn build_source(&self) -> Result<SourceHandle, ConfigError> {
        let settings = &self.current_settings;
        let leaves = settings
            .sources
            .iter()
            .map(|config| self.source_from_config(config))
            .collect::<Result<Vec<_>, _>>()?;

        let configured = if settings.cache {
            let loader = CachingLoader::new();
            for leaf in leaves {
                loader.add(leaf)?;
            }
            SourceHandle::new(loader)
        } else {
            let loader = FanOutLoader::new();
            for leaf in leaves {
                loader.add_source(leaf)?;
            }
            SourceHandle::new(loader)
        };

        if !settings.include_registry {
            return Ok(configured);
        }

        let top = FanOutLoader::new();
        top.add_source(configured)?;
        top.add_source(SourceHandle::new(RegistrySource::global()))?;
        Ok(SourceHandle::new(top))
    }

    fn source_from_config(&self, config: &SourceConfig) -> Result<SourceHandle, ConfigError> {
        let source = match config {
            SourceConfig::Directory { path, resource_directories, exclude_patterns } => {
                let root = self.resolve_path(path);
                tracing::debug!(root = %root.display(), "Configured directory source");
                SourceHandle::new(DirectorySource::new(
                    root,
                    resource_directories,
                    exclude_patterns,
                )?)
            }
            SourceConfig::Archive { path, resource_directories, exclude_patterns } => {
                let archive = self.resolve_path(path);
                tracing::debug!(archive = %archive.display(), "Configured archive source");
                SourceHandle::new(ArchiveSource::new(
                    archive,
                    resource_directories,
                    exclude_patterns,
                )?)
            }
            SourceConfig::Network { endpoint, applications, languages } => {
                tracing::debug!(endpoint = %endpoint, "Configured network source");
                SourceHandle::new(NetworkSource::new(
                    endpoint.clone(),
                    applications.clone(),
                    languages.clone(),
                ))
            }
        };
        Ok(source)
    }

    /// 相対パスをワークスペースルート基準で解決する
    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.workspace_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}
