use crate::catalog::Catalog;
use crate::error::{RecommendError, Result};
use crate::onehot::OneHotEncoder;
use crate::post::{Post, Query, ScoredPost};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_LIMIT: usize = 10;

/// How eligible candidates are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Descending hashtag overlap.
    #[default]
    Overlap,
    /// Ascending Euclidean distance in one-hot (location, hashtag) space.
    Nearest,
}

impl FromStr for Strategy {
    type Err = RecommendError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "overlap" => Ok(Strategy::Overlap),
            "nearest" | "knn" => Ok(Strategy::Nearest),
            other => Err(RecommendError::InvalidArgument(format!("unknown strategy {other:?}"))),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Overlap => write!(f, "overlap"),
            Strategy::Nearest => write!(f, "nearest"),
        }
    }
}

/// Top `limit` posts by hashtag overlap.
pub fn recommend<'a>(catalog: &'a Catalog, query: &Query, limit: usize) -> Result<Vec<ScoredPost<'a>>> {
    recommend_with(catalog, query, limit, Strategy::Overlap)
}

pub fn recommend_with<'a>(catalog: &'a Catalog, query: &Query, limit: usize, strategy: Strategy) -> Result<Vec<ScoredPost<'a>>> {
    if limit == 0 {
        return Err(RecommendError::InvalidArgument("limit must be a positive integer".into()));
    }
    let mut ranked = rank(catalog, query, strategy);
    ranked.truncate(limit);
    Ok(ranked)
}

/// Every eligible post in rank order, without truncation.
///
/// Posts sharing no hashtag with the query are never eligible, and an empty
/// hashtag set matches nothing. Equal keys keep catalog order.
pub fn rank<'a>(catalog: &'a Catalog, query: &Query, strategy: Strategy) -> Vec<ScoredPost<'a>> {
    if query.hashtags.is_empty() {
        return Vec::new();
    }
    let candidates: Vec<&Post> = match query.location.as_deref() {
        Some(loc) if !loc.is_empty() => catalog.posts_at(Some(loc)),
        _ => catalog.posts().iter().collect(),
    };

    let mut scored: Vec<ScoredPost<'a>> = candidates
        .into_iter()
        .filter_map(|post| {
            let score = post.overlap(&query.hashtags);
            (score > 0).then_some(ScoredPost { post, score, distance: None })
        })
        .collect();

    match strategy {
        Strategy::Overlap => {
            scored.sort_by(|a, b| b.score.cmp(&a.score));
        }
        Strategy::Nearest => {
            let encoder = OneHotEncoder::fit(catalog);
            let q = encoder.encode_query(query);
            for s in scored.iter_mut() {
                s.distance = Some(encoder.encode_post(s.post).euclidean(&q));
            }
            scored.sort_by(|a, b| {
                let (da, db) = (a.distance.unwrap_or(f32::INFINITY), b.distance.unwrap_or(f32::INFINITY));
                da.total_cmp(&db)
            });
        }
    }
    tracing::debug!(strategy = %strategy, hits = scored.len(), "ranked candidates");
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_parses_aliases() {
        assert_eq!("overlap".parse::<Strategy>().unwrap(), Strategy::Overlap);
        assert_eq!(" KNN ".parse::<Strategy>().unwrap(), Strategy::Nearest);
        assert!("cosine".parse::<Strategy>().is_err());
    }
}
