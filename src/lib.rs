//! translation-hub
//!
//! 複数のソース (ディレクトリ、翻訳 API、プロセス内レジストリ) から翻訳を非同期に
//! 読み込み、ロケールごとにマージして提供するライブラリ。
//!
//! ```no_run
//! use translation_hub::config::ConfigManager;
//! use translation_hub::Translator;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config_manager = ConfigManager::new();
//! config_manager.load_settings(Some("/path/to/workspace".into()))?;
//!
//! let source = config_manager.build_source()?;
//! let translator = Translator::create(source, config_manager.translator_options()).await?;
//!
//! println!("{}", translator.translate("de_de", "greeting", &[&"Welt"]));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod input;
pub mod model;
pub mod source;
mod test_utils;
pub mod translator;

pub use model::{
    Snapshot,
    TranslationUnit,
};
pub use source::{
    Source,
    SourceError,
    SourceHandle,
};
pub use translator::{
    Translator,
    TranslatorError,
    TranslatorOptions,
    TranslatorStatus,
};
