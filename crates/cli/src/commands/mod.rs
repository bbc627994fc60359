pub mod chat;
pub mod estimate;
pub mod onboard;
pub mod serve;
pub mod topics;

use std::path::Path;
use tensive_config::AppConfig;
use tensive_knowledge::KnowledgeStore;

pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    AppConfig::load().map_err(|e| format!("Failed to load config: {e}").into())
}

/// The configured knowledge file, or the built-in corpus.
pub fn load_knowledge(config: &AppConfig) -> Result<KnowledgeStore, Box<dyn std::error::Error>> {
    let path = config.knowledge.path.as_deref().map(Path::new);
    Ok(KnowledgeStore::load(path)?)
}
