//! Graph model and layout algorithms.

pub mod layout;
pub mod model;
pub mod quadtree;

pub use layout::ForceLayout;
pub use model::{ClickOutcome, Edge, Graph, Vertex, MAX_POLYGON_SIDES, MIN_POLYGON_SIDES};
