pub mod aggregate;

pub use aggregate::{Article, ARTICLE_CATEGORIES, ARTICLE_STATUSES};
