//! `.translations.json` の読み込み

use std::path::{
    Path,
    PathBuf,
};

use super::{
    CONFIG_FILE_NAME,
    ConfigError,
    TranslationSettings,
};

/// ワークスペース内の設定ファイルのパス
pub(super) fn config_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(CONFIG_FILE_NAME)
}

/// ワークスペースの設定ファイルを読み込む
///
/// 設定ファイルがなければ `Ok(None)` を返し、呼び出し側がデフォルト設定を使う。
/// バリデーションは行わない。
///
/// # Errors
/// - 設定ファイルを読めない場合 (ディレクトリである場合を含む)
/// - JSON として不正、または `sources` の `type` が未知の場合
pub(super) fn load_from_workspace(
    workspace_root: &Path,
) -> Result<Option<TranslationSettings>, ConfigError> {
    let path = config_path(workspace_root);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No translation settings file, using defaults");
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path)?;
    let settings: TranslationSettings = serde_json::from_str(&content)?;
    tracing::debug!(
        path = %path.display(),
        sources = settings.sources.len(),
        "Read translation settings"
    );

    Ok(Some(settings))
}
