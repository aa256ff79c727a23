use thiserror::Error;
use toy_syntax::NodeId;

pub type Result<T, E = SemanticError> = std::result::Result<T, E>;

/// Structural failures. These mean the passes disagree about the tree, not
/// that the user's source is wrong, so they abort the compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    #[error("{node:?} was never bound to a scope by the pre-registration pass")]
    MissingScopeBinding { node: NodeId },
    #[error("{node:?} is bound to a scope that is not a {expected}")]
    UnexpectedScope { node: NodeId, expected: &'static str },
    #[error("{node:?} is a {found} where a {expected} was expected")]
    UnexpectedNode {
        node: NodeId,
        found: &'static str,
        expected: &'static str,
    },
    #[error("malformed syntax tree: {0}")]
    Syntax(#[from] toy_syntax::Error),
}
