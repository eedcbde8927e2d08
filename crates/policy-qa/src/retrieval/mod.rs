//! Keyword retrieval over the cached chunks

mod keywords;
mod search;

pub use keywords::parse_key_terms;
pub use search::{select_context, ContextSelection, Retrieval, Retriever};
