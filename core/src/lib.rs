pub mod catalog;
pub mod error;
pub mod image;
pub mod matcher;
pub mod onehot;
pub mod persist;
pub mod post;
pub mod shared;
pub mod tags;

pub use catalog::{Catalog, LoadOptions};
pub use error::{RecommendError, Result};
pub use matcher::{rank, recommend, recommend_with, Strategy, DEFAULT_LIMIT};
pub use post::{Post, PostId, Query, ScoredPost};
pub use shared::SharedCatalog;
