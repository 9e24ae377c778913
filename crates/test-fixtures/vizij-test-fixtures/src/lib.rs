use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    avatars: HashMap<String, String>,
    stages: HashMap<String, StageEntry>,
}

/// A stage fixture is either a bare config path or a config plus the avatar
/// its URL is expected to resolve to.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StageEntry {
    Path(String),
    Detailed {
        config: String,
        #[serde(default)]
        avatar: Option<String>,
    },
}

impl StageEntry {
    fn config_path(&self) -> &str {
        match self {
            StageEntry::Path(path) => path,
            StageEntry::Detailed { config, .. } => config,
        }
    }

    fn avatar(&self) -> Option<&str> {
        match self {
            StageEntry::Path(_) => None,
            StageEntry::Detailed { avatar, .. } => avatar.as_deref(),
        }
    }
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// Asset descriptors: the root node name plus the clip list a loader would
/// report after parsing a model file.
pub mod avatars {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.avatars.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.avatars, "avatar", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.avatars, "avatar", name)?;
        super::load_json(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.avatars, "avatar", name)?;
        Ok(resolve_path(rel))
    }
}

/// Stage configurations (asset URL and surface size), optionally paired with
/// the avatar fixture their URL resolves to.
pub mod stages {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.stages.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.stages, "stage", name)?;
        read_to_string(entry.config_path())
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = lookup(&MANIFEST.stages, "stage", name)?;
        super::load_json(entry.config_path())
    }

    /// The avatar fixture this stage's URL resolves to, if any.
    pub fn avatar<T: DeserializeOwned>(name: &str) -> Result<Option<T>> {
        let entry = lookup(&MANIFEST.stages, "stage", name)?;
        match entry.avatar() {
            Some(avatar) => super::avatars::load(avatar).map(Some),
            None => Ok(None),
        }
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.stages, "stage", name)?;
        Ok(resolve_path(entry.config_path()))
    }
}
