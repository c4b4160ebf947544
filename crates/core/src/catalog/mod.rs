//! Catalog transformations: the product filter pipeline and the category tree.
//!
//! Both are pure functions of their inputs and are recomputed per request;
//! collections here are small (tens of items).

pub mod filter;
pub mod tree;

pub use filter::{ProductQuery, SortKey, available_cities, price_bounds};
pub use tree::{CategoryNode, CategoryTree, TreeRow};
