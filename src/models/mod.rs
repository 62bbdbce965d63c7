//! Data passed between pipeline stages: the DOIs to look up and the
//! identifiers found for them.

mod doi_set;
mod ids;

pub use doi_set::DoiSet;
pub use ids::{ArticleIds, IdMap, IdRecord};
