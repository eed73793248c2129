//! Syntax tree of the metadata language.
//!
//! Nodes live in one arena per parse and are addressed by [`Node`] indices. Navigation goes
//! through [`NodeRef`] handles that borrow the finished, read-only [`SyntaxTree`].

mod dump;
mod flags;
mod literal;
mod node;
mod token_kind;
mod tree;

/// Typed node facets and the flag vocabulary used to query them.
pub use flags::{Delimiter, FlagSet, LiteralKind, NodeFlag, NodeFlags, Separator};
/// String literal styles shared by the tokenizer and the tree.
pub use literal::{Quote, StringStyle};
/// Borrowed node handles and deep matching.
pub use node::{MatchFlags, NodeRef};
/// Token kinds produced by the tokenizer.
pub use token_kind::TokenKind;
/// Tree storage and construction.
pub use tree::{Entry, Node, NodeData, NodeKind, SyntaxTree, TreeBuilder};
