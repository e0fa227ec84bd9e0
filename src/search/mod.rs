pub mod title;

pub use title::{TitleHit, TitleMatcher};

/// Default cap on title search results
pub const DEFAULT_SEARCH_LIMIT: usize = 100;
