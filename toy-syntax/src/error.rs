use thiserror::Error;

use crate::NodeId;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("root {root:?} is not a node of the tree")]
    InvalidRoot { root: NodeId },
    #[error("{parent:?} refers to {child:?} which is not a node of the tree")]
    DanglingChild { parent: NodeId, child: NodeId },
    #[error("{child:?} under {parent:?} is a {found}, expected {expected}")]
    UnexpectedChild {
        parent: NodeId,
        child: NodeId,
        found: &'static str,
        expected: &'static str,
    },
    #[error("{child:?} has more than one parent")]
    SharedChild { child: NodeId },
}
