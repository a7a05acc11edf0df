//! Client for the remote headlines API.
//!
//! Two endpoints are consumed: `sources` (the outlets that can be searched)
//! and `top-headlines` (the search itself). Results are returned in response
//! order; callers number them for display but never store those numbers.

mod client;
mod types;

pub use client::{NewsClient, NewsError, PAGE_SIZE};
pub use types::{Article, ArticleSource, Source, SourceSelection};
