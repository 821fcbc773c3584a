//! One-hot feature space over a catalog's locations and hashtags, used by the
//! nearest-neighbor strategy. Vectors are binary, so they are kept sparse as
//! sorted feature indices.

use crate::catalog::Catalog;
use crate::post::{Post, Query};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Feature {
    Location(String),
    Hashtag(String),
}

/// Sorted indices of the set features.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseVector(Vec<usize>);

impl SparseVector {
    fn from_unsorted(mut idx: Vec<usize>) -> Self {
        idx.sort_unstable();
        idx.dedup();
        Self(idx)
    }

    /// Euclidean distance between two binary vectors: sqrt of the symmetric difference size.
    pub fn euclidean(&self, other: &SparseVector) -> f32 {
        let (a, b) = (&self.0, &other.0);
        let (mut i, mut j, mut shared) = (0, 0, 0usize);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    shared += 1;
                    i += 1;
                    j += 1;
                }
            }
        }
        ((a.len() + b.len() - 2 * shared) as f32).sqrt()
    }
}

#[derive(Debug, Default)]
pub struct OneHotEncoder {
    vocabulary: HashMap<Feature, usize>,
}

impl OneHotEncoder {
    /// Assign one dimension per distinct location and per distinct hashtag.
    pub fn fit(catalog: &Catalog) -> Self {
        let mut vocabulary = HashMap::new();
        for post in catalog.posts() {
            let next = vocabulary.len();
            vocabulary.entry(Feature::Location(post.location.clone())).or_insert(next);
            for tag in &post.hashtags {
                let next = vocabulary.len();
                vocabulary.entry(Feature::Hashtag(tag.clone())).or_insert(next);
            }
        }
        Self { vocabulary }
    }

    pub fn encode_post(&self, post: &Post) -> SparseVector {
        self.encode(Some(&post.location), post.hashtags.iter())
    }

    /// Features the catalog has never seen are ignored.
    pub fn encode_query(&self, query: &Query) -> SparseVector {
        self.encode(query.location.as_deref(), query.hashtags.iter())
    }

    fn encode<'a>(&self, location: Option<&str>, hashtags: impl Iterator<Item = &'a String>) -> SparseVector {
        let mut idx = Vec::new();
        if let Some(loc) = location {
            if let Some(&i) = self.vocabulary.get(&Feature::Location(loc.to_string())) {
                idx.push(i);
            }
        }
        for tag in hashtags {
            if let Some(&i) = self.vocabulary.get(&Feature::Hashtag(tag.clone())) {
                idx.push(i);
            }
        }
        SparseVector::from_unsorted(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_counts_differing_features() {
        let a = SparseVector::from_unsorted(vec![0, 2, 5]);
        let b = SparseVector::from_unsorted(vec![5, 2, 7, 9]);
        // differ on 0, 7, 9
        assert!((a.euclidean(&b) - 3f32.sqrt()).abs() < 1e-6);
        assert_eq!(a.euclidean(&a), 0.0);
    }
}
