use arena_common::types::Language;
use std::collections::HashMap;
use std::sync::Arc;

use crate::adapter::LanguageAdapter;
use crate::config::LanguageConfigManager;
use crate::languages::{CAdapter, JavaAdapter, PythonAdapter};

/// Language tag → adapter. Built once at startup, read-only afterwards.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<Language, Arc<dyn LanguageAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Python, Java and C with the built-in toolchains.
    pub fn with_defaults() -> Self {
        Self::from_config(&LanguageConfigManager::builtin())
    }

    /// One adapter per language, toolchains taken from `config` where
    /// present.
    pub fn from_config(config: &LanguageConfigManager) -> Self {
        let mut registry = Self::new();
        registry.register(PythonAdapter::from_config(config.get_config(Language::Python)));
        registry.register(JavaAdapter::from_config(config.get_config(Language::Java)));
        registry.register(CAdapter::from_config(config.get_config(Language::C)));
        registry
    }

    pub fn register(&mut self, adapter: impl LanguageAdapter + 'static) {
        self.adapters.insert(adapter.language(), Arc::new(adapter));
    }

    /// Resolve a wire tag; unknown and unregistered tags both yield `None`.
    pub fn get(&self, tag: &str) -> Option<Arc<dyn LanguageAdapter>> {
        Language::from_str(tag).and_then(|language| self.adapters.get(&language).cloned())
    }

    pub fn languages(&self) -> Vec<Language> {
        let mut languages: Vec<Language> = self.adapters.keys().copied().collect();
        languages.sort_by_key(|l| l.as_str());
        languages
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("languages", &self.languages())
            .finish()
    }
}
