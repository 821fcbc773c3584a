use crate::error::{RecommendError, Result};
use crate::post::{Post, PostId};
use crate::tags::parse_hashtags;
use encoding_rs::{Encoding, UTF_8};
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const LOCATION_COLUMNS: &[&str] = &["location"];
const HASHTAG_COLUMNS: &[&str] = &["hashtag", "hashtags"];
const IMAGE_COLUMNS: &[&str] = &["image_url", "image_ref"];
const TITLE_COLUMNS: &[&str] = &["image_title", "title"];

/// How to read a tabular source.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub encoding: &'static Encoding,
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { encoding: UTF_8, delimiter: b',' }
    }
}

impl LoadOptions {
    /// Resolve a WHATWG encoding label such as `utf-8`, `latin1` or `windows-1252`.
    pub fn with_encoding_label(mut self, label: &str) -> Result<Self> {
        self.encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| RecommendError::DataFormat(format!("unknown encoding label {label:?}")))?;
        Ok(self)
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// Immutable, ordered collection of posts with a location index.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    posts: Vec<Post>,
    by_location: HashMap<String, Vec<usize>>,
}

impl Catalog {
    /// Parse a CSV table. Requires `location`, `hashtag` and `image_url` columns;
    /// `image_title` is optional.
    pub fn load<R: Read>(mut source: R, opts: &LoadOptions) -> Result<Self> {
        let mut bytes = Vec::new();
        source.read_to_end(&mut bytes)?;
        // a BOM overrides the configured encoding
        let (text, used, had_errors) = opts.encoding.decode(&bytes);
        if had_errors {
            return Err(RecommendError::DataFormat(format!("input is not valid {}", used.name())));
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(opts.delimiter)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_lowercase()).collect();
        let location_col = required_column(&headers, LOCATION_COLUMNS)?;
        let hashtag_col = required_column(&headers, HASHTAG_COLUMNS)?;
        let image_col = required_column(&headers, IMAGE_COLUMNS)?;
        let title_col = find_column(&headers, TITLE_COLUMNS);

        let mut posts = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let location = record.get(location_col).unwrap_or("").trim();
            if location.is_empty() {
                return Err(RecommendError::DataFormat(format!("row {} has an empty location", row + 1)));
            }
            let title = title_col
                .and_then(|c| record.get(c))
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            posts.push(Post {
                // assigned by from_posts
                id: 0,
                location: location.to_string(),
                hashtags: parse_hashtags(record.get(hashtag_col).unwrap_or("")),
                image_ref: record.get(image_col).unwrap_or("").trim().to_string(),
                title,
            });
        }

        let catalog = Self::from_posts(posts)?;
        tracing::info!(num_posts = catalog.len(), encoding = used.name(), "catalog loaded");
        Ok(catalog)
    }

    pub fn load_file<P: AsRef<Path>>(path: P, opts: &LoadOptions) -> Result<Self> {
        let f = File::open(path.as_ref())?;
        Self::load(f, opts)
    }

    /// Build from already-parsed posts, renumbering ids in order.
    /// Fails when there are more posts than `PostId` can number.
    pub fn from_posts(mut posts: Vec<Post>) -> Result<Self> {
        let mut by_location: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, post) in posts.iter_mut().enumerate() {
            post.id = post_id(idx)?;
            by_location.entry(post.location.clone()).or_default().push(idx);
        }
        Ok(Self { posts, by_location })
    }

    /// Posts at exactly `location`, in catalog order. Unknown or absent location yields nothing.
    pub fn posts_at(&self, location: Option<&str>) -> Vec<&Post> {
        location
            .and_then(|l| self.by_location.get(l))
            .map(|idxs| idxs.iter().map(|&i| &self.posts[i]).collect())
            .unwrap_or_default()
    }

    pub fn all_locations(&self) -> BTreeSet<String> {
        self.by_location.keys().cloned().collect()
    }

    /// Distinct hashtags across the catalog, sorted.
    pub fn all_hashtags(&self) -> Vec<String> {
        let set: BTreeSet<&String> = self.posts.iter().flat_map(|p| p.hashtags.iter()).collect();
        set.into_iter().cloned().collect()
    }

    pub fn posts(&self) -> &[Post] { &self.posts }

    pub fn get(&self, id: PostId) -> Option<&Post> { self.posts.get(id as usize) }

    pub fn len(&self) -> usize { self.posts.len() }

    pub fn is_empty(&self) -> bool { self.posts.is_empty() }

    pub fn into_posts(self) -> Vec<Post> { self.posts }
}

fn post_id(idx: usize) -> Result<PostId> {
    PostId::try_from(idx).map_err(|_| RecommendError::DataFormat(format!("catalog exceeds {} posts", PostId::MAX)))
}

fn find_column(headers: &[String], names: &[&str]) -> Option<usize> {
    names.iter().find_map(|name| headers.iter().position(|h| h == name))
}

fn required_column(headers: &[String], names: &[&str]) -> Result<usize> {
    find_column(headers, names).ok_or_else(|| {
        RecommendError::DataFormat(format!(
            "missing required column {:?} (found {:?})",
            names[0], headers
        ))
    })
}
