//! Graph store: data model, cycle enforcement, traversal, merge/prune, and
//! presentation helpers, each concern split into its own file.

pub mod dag;
pub mod prune;
pub mod render;
pub mod store;
pub mod traversal;

pub use render::GraphStats;
pub use store::Graph;
