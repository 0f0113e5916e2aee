use super::{PluginDescriptor, PluginManifest};
use crate::error::{PluginLoadError, RegistryError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name-indexed plugin table. Registration order is preserved and the
/// first plugin to claim a name keeps it.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    plugins: Vec<PluginDescriptor>,
    index: HashMap<String, usize>,
}

impl PluginRegistry {
    /// Scan one plugin directory.
    pub fn load(dir: &Path) -> Result<Self, RegistryError> {
        Self::load_all(&[dir.to_path_buf()])
    }

    /// Scan every directory in order, registering across all of them.
    ///
    /// A missing or unreadable directory is only fatal when it is the
    /// sole directory; an empty result is always an error.
    pub fn load_all(dirs: &[PathBuf]) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        let mut seen_dirs: Vec<&PathBuf> = Vec::new();

        for dir in dirs {
            if seen_dirs.contains(&dir) {
                continue;
            }
            seen_dirs.push(dir);

            match manifest_files(dir) {
                Ok(files) => {
                    for file in files {
                        registry.load_manifest(&file);
                    }
                }
                Err(e) if dirs.len() == 1 => return Err(e),
                Err(e) => warn!("⚠️ {}", e),
            }
        }

        if registry.is_empty() {
            let dir = dirs.first().cloned().unwrap_or_default();
            return Err(RegistryError::Empty(dir));
        }

        info!(
            "🔌 Loaded {} plugin(s): {}",
            registry.len(),
            registry.names().join(", ")
        );
        Ok(registry)
    }

    /// Build a registry from already constructed plugins.
    pub fn from_descriptors(
        source: &Path,
        descriptors: impl IntoIterator<Item = PluginDescriptor>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        for descriptor in descriptors {
            if let Err(e) = registry.register(descriptor) {
                warn!("⚠️ {}", e);
            }
        }
        if registry.is_empty() {
            return Err(RegistryError::Empty(source.to_path_buf()));
        }
        Ok(registry)
    }

    fn load_manifest(&mut self, path: &Path) {
        let descriptor =
            PluginManifest::from_file(path).and_then(|manifest| manifest.into_descriptor(path));
        let result = descriptor.and_then(|descriptor| self.register(descriptor));
        if let Err(e) = result {
            warn!("⚠️ Skipping plugin: {}", e);
        }
    }

    /// Add a plugin unless its name is already taken.
    pub fn register(&mut self, descriptor: PluginDescriptor) -> Result<(), PluginLoadError> {
        if self.index.contains_key(&descriptor.name) {
            return Err(PluginLoadError::Duplicate(descriptor.name));
        }
        debug!(
            "Registered plugin {} v{} from {}",
            descriptor.name,
            descriptor.version,
            descriptor.source.display()
        );
        self.index
            .insert(descriptor.name.clone(), self.plugins.len());
        self.plugins.push(descriptor);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&PluginDescriptor> {
        self.index.get(name).map(|&i| &self.plugins[i])
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PluginDescriptor> {
        self.plugins.iter()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// `*.yml` and `*.yaml` regular files in `dir`, sorted by path.
fn manifest_files(dir: &Path) -> Result<Vec<PathBuf>, RegistryError> {
    if !dir.is_dir() {
        return Err(RegistryError::MissingDirectory(dir.to_path_buf()));
    }
    let entries = std::fs::read_dir(dir).map_err(|source| RegistryError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            matches!(
                path.extension().and_then(|ext| ext.to_str()),
                Some("yml") | Some("yaml")
            )
        })
        .collect();
    files.sort();
    Ok(files)
}
