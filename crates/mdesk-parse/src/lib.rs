//! Recursive-descent parser for the metadata language.
//!
//! Parsing never fails: problems are reported as [`Diagnostic`]s and the tree keeps its shape
//! through `Error` nodes.

use camino::Utf8PathBuf;
use mdesk_errors::{Diagnostic, Diagnostics};
use mdesk_inputs::SourceFile;
use mdesk_syntax::{NodeData, NodeKind, NodeRef, SyntaxTree};
use text_size::{TextRange, TextSize};

mod grammar;
mod parser;

use grammar::Context;
use parser::Parser;

/// A finished parse: the tree, the node that was asked for, and everything reported on the way.
#[derive(Debug)]
pub struct Parse {
    tree: SyntaxTree,
    end: TextSize,
    diagnostics: Diagnostics,
}

impl Parse {
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    /// The parsed node, or the `File` root for whole-document parses. `None` when a single-node
    /// parse found nothing but trivia.
    pub fn node(&self) -> Option<NodeRef<'_>> {
        self.tree.root()
    }

    /// Offset of the first token that was not consumed.
    pub fn end(&self) -> TextSize {
        self.end
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_parts(self) -> (SyntaxTree, Diagnostics) {
        (self.tree, self.diagnostics)
    }
}

/// Parses the single node starting at or after `offset`.
pub fn parse_one_node(text: &[u8], offset: TextSize) -> Parse {
    let file = SourceFile::new("<string>", text);

    let mut p = Parser::new(&file, offset);
    let node = if p.at_eof() {
        None
    } else {
        Some(grammar::node(&mut p, Context::Top).unwrap_or_else(|| grammar::unexpected(&mut p)))
    };

    let (builder, diagnostics, end) = p.finish();
    Parse { tree: builder.finish(file, node), end, diagnostics }
}

/// Parses a whole document under a `File` root named `name`.
pub fn parse_whole_string(name: impl Into<Utf8PathBuf>, text: &[u8]) -> Parse {
    parse_file(SourceFile::new(name, text))
}

/// Reads and parses `path`. A file that cannot be read gives an empty `File` root and a single
/// diagnostic.
pub fn parse_whole_file(path: impl Into<Utf8PathBuf>) -> Parse {
    let path = path.into();
    match SourceFile::read(path.clone()) {
        Ok(file) => parse_file(file),
        Err(err) => {
            tracing::debug!(%path, %err, "cannot read input");

            let file = SourceFile::new(path, Vec::new());
            let mut builder = mdesk_syntax::TreeBuilder::new();
            let root = builder.alloc(file_root(&file));

            let message = format!("cannot read `{}`: {err}", file.path());
            let mut diagnostics = Diagnostics::new();
            diagnostics.push(Diagnostic::error(message, TextRange::default()).with_node(root));
            Parse { tree: builder.finish(file, Some(root)), end: TextSize::new(0), diagnostics }
        }
    }
}

fn parse_file(file: SourceFile) -> Parse {
    let _span =
        tracing::debug_span!("parse", path = %file.path(), bytes = file.bytes().len()).entered();

    let mut p = Parser::new(&file, TextSize::new(0));
    let root = p.builder().alloc(file_root(&file));
    grammar::entries(&mut p, root, Context::Top);

    let (builder, diagnostics, end) = p.finish();
    tracing::debug!(nodes = builder.len(), diagnostics = diagnostics.len(), "parsed");
    Parse { tree: builder.finish(file, Some(root)), end, diagnostics }
}

fn file_root(file: &SourceFile) -> NodeData {
    let mut data = NodeData::new(NodeKind::File, file.path().as_str());
    data.range = TextRange::up_to(file.len());
    data
}
