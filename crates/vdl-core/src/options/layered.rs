//! Read-through view of an overlay on top of file options.

use serde_json::Value;

use super::JobOptions;

/// Two maps: the options as loaded and a delta over them. Lookups check the
/// overlay first; writes only ever touch the overlay.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayeredOptions {
    base: JobOptions,
    overlay: JobOptions,
}

impl LayeredOptions {
    pub fn new(base: JobOptions, overlay: JobOptions) -> Self {
        Self { base, overlay }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.overlay.get(key).or_else(|| self.base.get(key))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.overlay.insert(key.into(), value);
    }

    pub fn base(&self) -> &JobOptions {
        &self.base
    }

    pub fn overlay(&self) -> &JobOptions {
        &self.overlay
    }

    /// Keys of both layers, each once.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.overlay
            .keys()
            .chain(self.base.keys().filter(|k| !self.overlay.contains_key(*k)))
    }

    /// One flat map with overlay values winning.
    pub fn resolve(&self) -> JobOptions {
        let mut flat = self.base.clone();
        flat.extend(self.overlay.iter().map(|(k, v)| (k.clone(), v.clone())));
        flat
    }
}
