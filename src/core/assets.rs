//=========================================================================
// Asset Manager
//=========================================================================
//
// Engine-owned registry of named texture assets.
//
// Textures are registered by name and source path and referred to by a
// small copyable `TextureId`. Decoding and GPU upload belong to the
// render backend; the registry only tracks identity and location.
//
// The manager is owned by `Engine`, exposed to entities through the frame
// context, and dropped after every level during teardown.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

//=== TextureId ===========================================================

/// Dense identifier of a registered texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

//=== Texture =============================================================

/// A registered texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    pub id: TextureId,
    pub name: String,
    pub path: PathBuf,
}

//=== AssetManager ========================================================

/// Name → texture registry.
///
/// # Examples
///
/// ```
/// use keystone_engine::core::assets::AssetManager;
///
/// let mut assets = AssetManager::new();
/// let player = assets.register_texture("player", "textures/player.png");
///
/// assert_eq!(assets.texture("player").map(|t| t.id), Some(player));
/// assert_eq!(assets.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct AssetManager {
    textures: Vec<Texture>,
    by_name: HashMap<String, TextureId>,
}

impl AssetManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a texture, returning its id.
    ///
    /// Re-registering a name keeps its id and updates the path.
    pub fn register_texture(&mut self, name: &str, path: impl AsRef<Path>) -> TextureId {
        let path = path.as_ref().to_path_buf();

        if let Some(&id) = self.by_name.get(name) {
            if let Some(texture) = self.textures.get_mut(id.0 as usize) {
                if texture.path != path {
                    warn!(
                        target: "assets",
                        "Texture '{}' re-registered: {} -> {}",
                        name,
                        texture.path.display(),
                        path.display()
                    );
                    texture.path = path;
                }
            }
            return id;
        }

        let id = TextureId(self.textures.len() as u32);
        debug!(target: "assets", "Texture '{}' registered as {:?} ({})", name, id, path.display());
        self.textures.push(Texture {
            id,
            name: name.to_string(),
            path,
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn texture(&self, name: &str) -> Option<&Texture> {
        self.by_name
            .get(name)
            .and_then(|id| self.textures.get(id.0 as usize))
    }

    pub fn texture_by_id(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id.0 as usize)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Releases every texture. Ids issued before are invalidated.
    pub fn clear(&mut self) {
        if !self.textures.is_empty() {
            info!(target: "assets", "Releasing {} textures", self.textures.len());
        }
        self.textures.clear();
        self.by_name.clear();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
