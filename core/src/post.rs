use crate::tags::{normalize_tag, parse_hashtags};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type PostId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Position in catalog order.
    pub id: PostId,
    pub location: String,
    pub hashtags: BTreeSet<String>,
    /// URL or path of the display image; never interpreted here.
    pub image_ref: String,
    pub title: Option<String>,
}

impl Post {
    /// Number of tags shared with `tags`.
    pub fn overlap(&self, tags: &BTreeSet<String>) -> usize {
        // iterate the smaller set
        if self.hashtags.len() <= tags.len() {
            self.hashtags.iter().filter(|t| tags.contains(*t)).count()
        } else {
            tags.iter().filter(|t| self.hashtags.contains(*t)).count()
        }
    }
}

/// A caller's request: optional location plus normalized hashtags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub location: Option<String>,
    pub hashtags: BTreeSet<String>,
}

impl Query {
    /// Build a query from raw user text. A blank location means "any location".
    pub fn new(location: Option<&str>, hashtags: &str) -> Self {
        Self::from_tags(location, parse_hashtags(hashtags))
    }

    /// Build a query from tags that are already split. Each tag is normalized.
    pub fn from_tags<I, S>(location: Option<&str>, hashtags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let location = location
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string);
        let hashtags = hashtags.into_iter().filter_map(|t| normalize_tag(t.as_ref())).collect();
        Self { location, hashtags }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPost<'a> {
    pub post: &'a Post,
    /// |post.hashtags ∩ query.hashtags|, always > 0 in results.
    pub score: usize,
    /// Euclidean distance in one-hot space; set by the nearest-neighbor strategy only.
    pub distance: Option<f32>,
}
