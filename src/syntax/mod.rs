//! Syntax tree layer: tree/snapshot association and leaf-span queries.

mod leaf;
mod tree;

pub use leaf::{ChangeOwner, LeafSpan, locate_owner};
pub use tree::{SyntaxTree, structurally_equal};
