//! Edge-list provider for `ghs-core`.
//!
//! Reads graphs written one edge per line as `node node weight` and renders
//! spanning trees in the matching result format.

mod errors;
mod render;
mod source;

pub use errors::EdgeListError;
pub use render::render_tree;
pub use source::EdgeListSource;
