//! Contract errors raised by tree operations.

use thiserror::Error;

use crate::NodeId;

/// A tree operation was called with arguments that violate the tree's
/// structural contract.
///
/// These are programming errors on the caller's side: no input document is
/// at fault, so they are kept distinct from selector syntax errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// The id does not refer to a node allocated in this tree.
    #[error("node {0} does not exist in this tree")]
    UnknownNode(NodeId),

    /// An element-only operation was called on another node type.
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),

    /// Text, comment, CDATA and doctype nodes cannot have children.
    #[error("node {0} cannot have children")]
    InvalidParent(NodeId),

    /// The reference node is not a child of the given parent.
    #[error("node {child} is not a child of node {parent}")]
    NotAChild {
        /// The expected parent.
        parent: NodeId,
        /// The node that was expected to be its child.
        child: NodeId,
    },

    /// Inserting the node would make it its own ancestor, or would move a
    /// document node under another node.
    #[error("node {child} cannot be inserted under node {parent}")]
    HierarchyRequest {
        /// The would-be parent.
        parent: NodeId,
        /// The node being inserted.
        child: NodeId,
    },

    /// The nodes do not share a root, so they have no relative order.
    #[error("nodes {0} and {1} are not in the same tree")]
    Disconnected(NodeId, NodeId),
}
