use anyhow::{Context, Result};
use recommender::image::resolve_image_url;
use recommender::persist::{save_snapshot, MetaFile, SnapshotPaths, SNAPSHOT_VERSION};
use recommender::{Catalog, LoadOptions, ScoredPost};
use serde::Serialize;
use walkdir::WalkDir;

use std::path::{Path, PathBuf};

/// CSV files under `input`, sorted by path. A file path is returned as is.
pub fn collect_inputs(input: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && p.extension().and_then(|s| s.to_str()).map(|e| e.eq_ignore_ascii_case("csv")).unwrap_or(false) {
                files.push(p.to_path_buf());
            }
        }
        files.sort();
    } else if input.is_file() {
        files.push(input.to_path_buf());
    }
    files
}

/// Load every input table and concatenate them in path order.
pub fn load_inputs(files: &[PathBuf], opts: &LoadOptions) -> Result<Catalog> {
    let mut posts = Vec::new();
    for file in files {
        let catalog = Catalog::load_file(file, opts).with_context(|| format!("loading {}", file.display()))?;
        tracing::info!(file = %file.display(), num_posts = catalog.len(), "read table");
        posts.extend(catalog.into_posts());
    }
    Ok(Catalog::from_posts(posts)?)
}

pub fn build_snapshot(input: &str, output: &str, opts: &LoadOptions) -> Result<Catalog> {
    let files = collect_inputs(Path::new(input));
    if files.is_empty() {
        anyhow::bail!("no CSV input found at {input}");
    }
    let catalog = load_inputs(&files, opts)?;
    tracing::info!(num_posts = catalog.len(), num_locations = catalog.all_locations().len(), "ingested posts");

    let meta = MetaFile {
        num_posts: u32::try_from(catalog.len())?,
        created_at: time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339).unwrap_or_else(|_| "".into()),
        version: SNAPSHOT_VERSION,
        source_encoding: opts.encoding.name().to_string(),
    };
    save_snapshot(&SnapshotPaths::new(output), &catalog, &meta)?;
    tracing::info!(output, "snapshot written");
    Ok(catalog)
}

#[derive(Debug, Serialize)]
pub struct HitLine<'a> {
    pub post_id: u32,
    pub score: usize,
    pub distance: Option<f32>,
    pub location: &'a str,
    pub title: Option<&'a str>,
    pub hashtags: Vec<&'a str>,
    pub image_url: String,
}

impl<'a> HitLine<'a> {
    pub fn new(hit: &ScoredPost<'a>, image_base_url: Option<&str>) -> Self {
        let post = hit.post;
        Self {
            post_id: post.id,
            score: hit.score,
            distance: hit.distance,
            location: &post.location,
            title: post.title.as_deref(),
            hashtags: post.hashtags.iter().map(String::as_str).collect(),
            image_url: resolve_image_url(image_base_url, &post.image_ref),
        }
    }
}

/// Human-readable listing, one hit per line.
pub fn render_text(hits: &[HitLine<'_>]) -> String {
    if hits.is_empty() {
        return "No recommendations found based on your input.\n".to_string();
    }
    let mut out = String::from("Recommendations:\n");
    for (rank, h) in hits.iter().enumerate() {
        let title = h.title.unwrap_or("(untitled)");
        let distance = h.distance.map(|d| format!(" distance={d:.3}")).unwrap_or_default();
        out.push_str(&format!(
            "{:>3}. [{}] {} - {}: {} (score={}{}) {}\n",
            rank + 1,
            h.post_id,
            title,
            h.location,
            h.hashtags.join(", "),
            h.score,
            distance,
            h.image_url
        ));
    }
    out
}
