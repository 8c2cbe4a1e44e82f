//! Where scene documents come from
//!
//! A [`SceneSource`] lists the available scenes once at startup and resolves
//! a listed scene into a parsed [`SceneDocument`] on demand.
//! [`DirectorySceneSource`] reads files under a root directory;
//! [`MemorySceneSource`] keeps documents in memory for tests and embedded
//! content.

use std::path::{Path, PathBuf};

use crate::config::DocumentFormat;
use crate::scene::{SceneDocument, SceneError};

/// Suffix that marks a file as a scene document (`level.scene.ron`)
pub const SCENE_SUFFIX: &str = ".scene";

/// A discovered scene: its name and a source-specific locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneEntry {
    /// Scene name
    pub name: String,
    /// Opaque locator understood by the source that produced it
    pub locator: String,
}

/// Provider of scene documents
pub trait SceneSource {
    /// Every available scene, in a stable order that defines scene indices
    fn discover(&self) -> Result<Vec<SceneEntry>, SceneError>;

    /// Read and parse one discovered scene
    fn resolve_scene(&self, entry: &SceneEntry) -> Result<SceneDocument, SceneError>;
}

/// Scene files below a root directory.
///
/// Any `*.scene.ron` or `*.scene.toml` file counts; the scene name is the
/// file name without the suffix. Scenes are ordered by name.
#[derive(Debug, Clone)]
pub struct DirectorySceneSource {
    root: PathBuf,
}

impl DirectorySceneSource {
    /// Source rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn scene_name(path: &Path) -> Option<String> {
        DocumentFormat::from_path(path)?;
        let stem = path.file_stem()?.to_str()?;
        stem.strip_suffix(SCENE_SUFFIX).map(str::to_string)
    }

    fn walk(dir: &Path, out: &mut Vec<SceneEntry>) -> Result<(), SceneError> {
        let io_err = |source| SceneError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut paths = std::fs::read_dir(dir)
            .map_err(io_err)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(io_err)?;
        paths.sort();

        for path in paths {
            if path.is_dir() {
                Self::walk(&path, out)?;
            } else if let Some(name) = Self::scene_name(&path) {
                out.push(SceneEntry {
                    name,
                    locator: path.display().to_string(),
                });
            }
        }
        Ok(())
    }
}

impl SceneSource for DirectorySceneSource {
    fn discover(&self) -> Result<Vec<SceneEntry>, SceneError> {
        let mut entries = Vec::new();
        Self::walk(&self.root, &mut entries)?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        let before = entries.len();
        entries.dedup_by(|later, first| {
            let duplicate = later.name == first.name;
            if duplicate {
                log::warn!(
                    "Scene '{}' found twice, ignoring {}",
                    later.name,
                    later.locator
                );
            }
            duplicate
        });
        log::debug!(
            "Discovered {} scenes under {} ({} duplicates)",
            entries.len(),
            self.root.display(),
            before - entries.len()
        );
        Ok(entries)
    }

    fn resolve_scene(&self, entry: &SceneEntry) -> Result<SceneDocument, SceneError> {
        let path = Path::new(&entry.locator);
        let contents = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let format = DocumentFormat::from_path(path).unwrap_or(DocumentFormat::Ron);
        format
            .parse(&contents)
            .map_err(|source| SceneError::Malformed {
                scene: entry.name.clone(),
                source,
            })
    }
}

/// In-memory scenes, indexed in insertion order
#[derive(Debug, Clone, Default)]
pub struct MemorySceneSource {
    scenes: Vec<(String, MemoryScene)>,
}

#[derive(Debug, Clone)]
enum MemoryScene {
    Parsed(SceneDocument),
    Text(DocumentFormat, String),
}

impl MemorySceneSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: Add a parsed document
    pub fn with_scene(mut self, name: impl Into<String>, document: SceneDocument) -> Self {
        self.insert(name, MemoryScene::Parsed(document));
        self
    }

    /// Builder pattern: Add a document as RON text, parsed when the scene is
    /// loaded
    pub fn with_ron(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, MemoryScene::Text(DocumentFormat::Ron, text.into()));
        self
    }

    /// Builder pattern: Add a document as TOML text, parsed when the scene is
    /// loaded
    pub fn with_toml(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, MemoryScene::Text(DocumentFormat::Toml, text.into()));
        self
    }

    fn insert(&mut self, name: impl Into<String>, scene: MemoryScene) {
        let name = name.into();
        match self.scenes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = scene,
            None => self.scenes.push((name, scene)),
        }
    }
}

impl SceneSource for MemorySceneSource {
    fn discover(&self) -> Result<Vec<SceneEntry>, SceneError> {
        Ok(self
            .scenes
            .iter()
            .map(|(name, _)| SceneEntry {
                name: name.clone(),
                locator: name.clone(),
            })
            .collect())
    }

    fn resolve_scene(&self, entry: &SceneEntry) -> Result<SceneDocument, SceneError> {
        let scene = self
            .scenes
            .iter()
            .find(|(name, _)| *name == entry.locator)
            .map(|(_, scene)| scene)
            .ok_or_else(|| SceneError::NotFound(entry.name.clone().into()))?;

        match scene {
            MemoryScene::Parsed(document) => Ok(document.clone()),
            MemoryScene::Text(format, text) => {
                format.parse(text).map_err(|source| SceneError::Malformed {
                    scene: entry.name.clone(),
                    source,
                })
            }
        }
    }
}
