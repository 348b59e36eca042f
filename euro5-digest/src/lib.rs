//! euro5-digest library - weekly European news digest
//!
//! Fetches the CSV feeds, validates each row against its feed's schema,
//! turns weekly rows into stories and derives the ISO week label. The
//! `view` and `render` modules are the thin reader-facing layer on top.

pub mod changelog;
pub mod error;
pub mod feeds;
pub mod fetcher;
pub mod loader;
pub mod pagination;
pub mod render;
pub mod rows;
pub mod schema;
pub mod tabular;
pub mod transform;
pub mod view;
pub mod week;

pub use error::{FeedError, FeedResult, LoadError};
pub use feeds::{Criticality, FeedKind, FeedSource};
pub use fetcher::FeedFetcher;
pub use loader::{Digest, DigestLoader, DigestSources};
pub use transform::{to_stories, NewsStory};
pub use view::{CategoryFilter, DigestView, LoadState};
pub use week::compute_week_label;
