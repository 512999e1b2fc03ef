//! GlobalsContext: main API surface for the globals registry.
//!
//! Manages global definitions as YAML files under a `globals/` directory,
//! one file per slug. Definitions are loaded once on open and indexed by slug.
//! A file only loads when its stem matches the slug inside it, so the file a
//! slug is written to is always the one it is read back from.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;
use ulid::Ulid;

use crate::error::{GlobalsError, Result};
use crate::types::GlobalDef;
use crate::wellformed::ensure_well_formed;

/// A collection of default global definitions.
///
/// Consumers build this to pass to `GlobalsContextBuilder::with_defaults()`.
/// On open, defaults whose slug has no file yet are written.
pub struct GlobalDefaults {
    globals: Vec<GlobalDef>,
}

impl GlobalDefaults {
    pub fn new() -> Self {
        Self {
            globals: Vec::new(),
        }
    }

    /// Add a default global definition.
    pub fn global(mut self, def: GlobalDef) -> Self {
        self.globals.push(def);
        self
    }

    pub fn globals(&self) -> &[GlobalDef] {
        &self.globals
    }
}

impl Default for GlobalDefaults {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `GlobalsContext`. Created by `GlobalsContext::open()`.
pub struct GlobalsContextBuilder {
    root: PathBuf,
    defaults: Option<GlobalDefaults>,
    create: bool,
}

impl GlobalsContextBuilder {
    /// Provide default globals. Seeded on open; existing files are preserved.
    pub fn with_defaults(mut self, defaults: GlobalDefaults) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Fail with `NotInitialized` instead of creating a missing `globals/` directory.
    pub fn existing_only(mut self) -> Self {
        self.create = false;
        self
    }

    /// Build the context: create directories, seed defaults, load from disk.
    pub async fn build(self) -> Result<GlobalsContext> {
        let root = self.root;
        let globals_dir = root.join("globals");

        if self.create {
            fs::create_dir_all(&globals_dir).await?;
        } else if !globals_dir.is_dir() {
            return Err(GlobalsError::NotInitialized { path: globals_dir });
        }

        if let Some(defaults) = self.defaults {
            seed_defaults(&globals_dir, &defaults).await?;
        }

        let mut ctx = GlobalsContext {
            root,
            globals: Vec::new(),
            slug_index: HashMap::new(),
        };
        ctx.load_globals().await?;

        debug!(globals = ctx.globals.len(), "globals context opened");

        Ok(ctx)
    }
}

/// Seed default globals whose slug has no file on disk.
async fn seed_defaults(globals_dir: &Path, defaults: &GlobalDefaults) -> Result<()> {
    for def in &defaults.globals {
        ensure_well_formed(def)?;
        let path = globals_dir.join(format!("{}.yaml", def.slug));
        if !path.exists() {
            let yaml = serde_yaml_ng::to_string(def)?;
            atomic_write(&path, yaml.as_bytes()).await?;
            debug!(slug = %def.slug, "seeded default global");
        }
    }
    Ok(())
}

/// Registry of global definitions.
///
/// Owns a directory on disk with the structure:
/// ```text
/// <root>/
///   globals/    ← one .yaml per global, named by slug
/// ```
pub struct GlobalsContext {
    root: PathBuf,
    globals: Vec<GlobalDef>,
    slug_index: HashMap<String, usize>,
}

impl GlobalsContext {
    /// Open or create a registry directory. Returns a builder for optional configuration.
    ///
    /// ```rust,ignore
    /// let ctx = GlobalsContext::open(path)
    ///     .with_defaults(globalkit_fields::defaults())
    ///     .build()
    ///     .await?;
    /// ```
    pub fn open(root: impl Into<PathBuf>) -> GlobalsContextBuilder {
        GlobalsContextBuilder {
            root: root.into(),
            defaults: None,
            create: true,
        }
    }

    /// Get a global by slug.
    pub fn get(&self, slug: &str) -> Option<&GlobalDef> {
        self.slug_index.get(slug).map(|&i| &self.globals[i])
    }

    /// Get a global by slug, failing with `GlobalNotFound`.
    pub fn require(&self, slug: &str) -> Result<&GlobalDef> {
        self.get(slug).ok_or_else(|| GlobalsError::GlobalNotFound {
            slug: slug.to_string(),
        })
    }

    /// All globals, in load order.
    pub fn all(&self) -> &[GlobalDef] {
        &self.globals
    }

    /// All slugs, sorted.
    pub fn slugs(&self) -> Vec<&str> {
        let mut slugs: Vec<&str> = self.globals.iter().map(|g| g.slug.as_str()).collect();
        slugs.sort_unstable();
        slugs
    }

    /// Write (create or update) a global. Rejects malformed declarations.
    pub async fn write(&mut self, def: &GlobalDef) -> Result<()> {
        ensure_well_formed(def)?;

        let yaml = serde_yaml_ng::to_string(def)?;
        atomic_write(&self.global_path(&def.slug), yaml.as_bytes()).await?;

        if let Some(&idx) = self.slug_index.get(&def.slug) {
            self.globals[idx] = def.clone();
        } else {
            let idx = self.globals.len();
            self.globals.push(def.clone());
            self.slug_index.insert(def.slug.clone(), idx);
        }
        debug!(slug = %def.slug, "wrote global");

        Ok(())
    }

    /// Delete a global by slug. The index is left untouched if the file
    /// cannot be removed.
    pub async fn delete(&mut self, slug: &str) -> Result<()> {
        let idx = *self
            .slug_index
            .get(slug)
            .ok_or_else(|| GlobalsError::GlobalNotFound {
                slug: slug.to_string(),
            })?;

        match fs::remove_file(self.global_path(slug)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.slug_index.remove(slug);
        debug!(slug, "deleted global");

        // Swap-remove and fix the moved entry's index
        self.globals.swap_remove(idx);
        if idx < self.globals.len() {
            self.slug_index.insert(self.globals[idx].slug.clone(), idx);
        }

        Ok(())
    }

    /// The root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn global_path(&self, slug: &str) -> PathBuf {
        self.root.join("globals").join(format!("{slug}.yaml"))
    }

    async fn load_globals(&mut self) -> Result<()> {
        let globals_dir = self.root.join("globals");
        let mut entries = fs::read_dir(&globals_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            let content = match fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(?path, %e, "skipping unreadable global definition");
                    continue;
                }
            };
            let stem = path.file_stem().and_then(|s| s.to_str());
            match serde_yaml_ng::from_str::<GlobalDef>(&content) {
                Ok(def) if stem != Some(def.slug.as_str()) => {
                    tracing::warn!(?path, slug = %def.slug, "skipping global whose file name does not match its slug");
                }
                Ok(def) if self.slug_index.contains_key(&def.slug) => {
                    tracing::warn!(?path, slug = %def.slug, "skipping duplicate global slug");
                }
                Ok(def) => {
                    let idx = self.globals.len();
                    self.slug_index.insert(def.slug.clone(), idx);
                    self.globals.push(def);
                }
                Err(e) => {
                    tracing::warn!(?path, %e, "skipping invalid global definition");
                }
            }
        }
        Ok(())
    }
}

/// Write to a temp file then rename for atomic persistence.
async fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "no parent dir"))?;
    let tmp = dir.join(format!(".tmp_{}", Ulid::new()));
    fs::write(&tmp, data).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}
