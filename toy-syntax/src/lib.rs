pub mod ast;
pub mod builder;
pub mod error;
pub mod walk;

pub use ast::{Node, NodeId, NodeKind, PrimitiveKeyword, SyntaxTree};
pub use builder::TreeBuilder;
pub use error::{Error, Result};
pub use walk::SyntaxListener;
