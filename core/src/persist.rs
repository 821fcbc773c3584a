use crate::catalog::Catalog;
use crate::post::Post;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_posts: u32,
    pub created_at: String,
    pub version: u32,
    pub source_encoding: String,
}

pub struct SnapshotPaths {
    pub root: PathBuf,
}

impl SnapshotPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn posts(&self) -> PathBuf { self.root.join("posts.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

pub fn save_posts(paths: &SnapshotPaths, posts: &[Post]) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.posts())?;
    let bytes = bincode::serialize(posts)?;
    f.write_all(&bytes)?;
    Ok(())
}

pub fn load_posts(paths: &SnapshotPaths) -> Result<Vec<Post>> {
    let mut f = File::open(paths.posts()).with_context(|| format!("opening {}", paths.posts().display()))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let posts = bincode::deserialize(&buf)?;
    Ok(posts)
}

pub fn save_meta(paths: &SnapshotPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &SnapshotPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta()).with_context(|| format!("opening {}", paths.meta().display()))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Write posts and meta for `catalog`.
pub fn save_snapshot(paths: &SnapshotPaths, catalog: &Catalog, meta: &MetaFile) -> Result<()> {
    save_posts(paths, catalog.posts())?;
    save_meta(paths, meta)?;
    Ok(())
}

/// Fully rebuild a catalog from a snapshot directory.
pub fn load_snapshot(paths: &SnapshotPaths) -> Result<Catalog> {
    let meta = load_meta(paths)?;
    if meta.version != SNAPSHOT_VERSION {
        anyhow::bail!("unsupported snapshot version {} (expected {})", meta.version, SNAPSHOT_VERSION);
    }
    let catalog = Catalog::from_posts(load_posts(paths)?)?;
    if catalog.len() != meta.num_posts as usize {
        anyhow::bail!("snapshot meta lists {} posts but posts.bin holds {}", meta.num_posts, catalog.len());
    }
    Ok(catalog)
}
