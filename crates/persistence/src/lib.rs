#![deny(warnings)]

//! Save slots for player snapshots.
//!
//! A [`SaveStore`] is a plain key-value store of bytes. Players are wrapped
//! in a versioned [`SaveEnvelope`] and encoded as JSON or bincode; loading
//! checks the version and re-validates the player's invariants.

use anyhow::{bail, Context, Result};
use life_core::{validate_player, Player};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// Version number for the save format (increment when the layout changes).
pub const SAVE_VERSION: u32 = 1;

/// Byte store keyed by slot name.
pub trait SaveStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn put(&mut self, key: &str, bytes: Vec<u8>) -> Result<()>;
    /// Returns whether the key existed.
    fn delete(&mut self, key: &str) -> Result<bool>;
    /// All keys, sorted.
    fn keys(&self) -> Result<Vec<String>>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.entries.insert(key.to_string(), bytes);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// One file per key under a directory.
#[derive(Clone, Debug)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Open `root`, creating it if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).with_context(|| format!("creating save dir {}", root.display()))?;
        Ok(Self { root })
    }

    fn path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            bail!("invalid save key {key:?}");
        }
        Ok(self.root.join(format!("{key}.save")))
    }
}

impl SaveStore for DirStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        Ok(Some(bytes))
    }

    fn put(&mut self, key: &str, bytes: Vec<u8>) -> Result<()> {
        let path = self.path(key)?;
        fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))
    }

    fn delete(&mut self, key: &str) -> Result<bool> {
        let path = self.path(key)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).with_context(|| format!("removing {}", path.display()))?;
        Ok(true)
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root).with_context(|| format!("listing {}", self.root.display()))? {
            let path = entry?.path();
            if path.extension().map_or(false, |e| e == "save") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveFormat {
    Json,
    Bincode,
}

impl SaveFormat {
    /// JSON saves are objects; anything else is taken as bincode.
    pub fn detect(bytes: &[u8]) -> Self {
        match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'{') => SaveFormat::Json,
            _ => SaveFormat::Bincode,
        }
    }
}

/// Serializable save slot contents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveEnvelope {
    pub version: u32,
    pub player: Player,
}

pub fn encode(player: &Player, format: SaveFormat) -> Result<Vec<u8>> {
    let envelope = SaveEnvelope {
        version: SAVE_VERSION,
        player: player.clone(),
    };
    let bytes = match format {
        SaveFormat::Json => serde_json::to_vec_pretty(&envelope).context("encoding JSON save")?,
        SaveFormat::Bincode => bincode::serialize(&envelope).context("encoding bincode save")?,
    };
    Ok(bytes)
}

pub fn decode(bytes: &[u8]) -> Result<Player> {
    let envelope: SaveEnvelope = match SaveFormat::detect(bytes) {
        SaveFormat::Json => serde_json::from_slice(bytes).context("decoding JSON save")?,
        SaveFormat::Bincode => bincode::deserialize(bytes).context("decoding bincode save")?,
    };
    if envelope.version != SAVE_VERSION {
        bail!(
            "save version {} is not supported (expected {})",
            envelope.version,
            SAVE_VERSION
        );
    }
    validate_player(&envelope.player).context("save contains an invalid player")?;
    Ok(envelope.player)
}

pub fn save_player(store: &mut dyn SaveStore, key: &str, player: &Player, format: SaveFormat) -> Result<()> {
    let bytes = encode(player, format)?;
    debug!(key, bytes = bytes.len(), ?format, "saving player");
    store.put(key, bytes)?;
    info!(key, name = %player.name, "player saved");
    Ok(())
}

/// Load the player in `key`; `None` when the slot is empty.
pub fn load_player(store: &dyn SaveStore, key: &str) -> Result<Option<Player>> {
    match store.get(key)? {
        Some(bytes) => decode(&bytes)
            .with_context(|| format!("loading save {key:?}"))
            .map(Some),
        None => Ok(None),
    }
}
