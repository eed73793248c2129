use la_arena::{Arena, Idx};
use mdesk_inputs::{CodeLoc, SourceFile};
use text_size::TextRange;

use crate::NodeFlags;
use crate::node::NodeRef;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NodeKind {
    /// Synthetic root of a parsed document.
    File,
    Main,
    Tag,
    /// Placeholder for input that could not be parsed.
    Error,
}

pub type Node = Idx<Entry>;

/// Payload of a node, everything except its position in the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeData {
    pub kind: NodeKind,
    pub flags: NodeFlags,
    /// Decoded text: delimiters stripped and common escapes resolved.
    pub string: Box<str>,
    /// Source text including delimiters, with invalid UTF-8 replaced by `?`.
    pub raw_string: Box<str>,
    /// Source bytes exactly as written.
    pub raw_bytes: Box<[u8]>,
    pub range: TextRange,
    pub pre_comment: Box<str>,
    pub post_comment: Box<str>,
}

impl NodeData {
    pub fn new(kind: NodeKind, string: impl Into<Box<str>>) -> Self {
        let string = string.into();
        Self {
            kind,
            flags: NodeFlags::default(),
            raw_string: string.clone(),
            raw_bytes: string.as_bytes().into(),
            string,
            range: TextRange::default(),
            pre_comment: Box::default(),
            post_comment: Box::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Links {
    pub(crate) parent: Option<Node>,
    pub(crate) first_child: Option<Node>,
    pub(crate) last_child: Option<Node>,
    pub(crate) first_tag: Option<Node>,
    pub(crate) last_tag: Option<Node>,
    pub(crate) next: Option<Node>,
    pub(crate) prev: Option<Node>,
    pub(crate) child_count: u32,
    pub(crate) tag_count: u32,
}

#[derive(Debug)]
pub struct Entry {
    pub(crate) data: NodeData,
    pub(crate) links: Links,
}

/// An immutable, arena-backed syntax tree for one source document.
#[derive(Debug)]
pub struct SyntaxTree {
    file: SourceFile,
    nodes: Arena<Entry>,
    root: Option<Node>,
}

impl SyntaxTree {
    pub fn file(&self) -> &SourceFile {
        &self.file
    }

    pub fn root(&self) -> Option<NodeRef<'_>> {
        self.root.map(|id| self.node(id))
    }

    pub fn node(&self, id: Node) -> NodeRef<'_> {
        NodeRef::new(self, id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn code_loc(&self, id: Node) -> CodeLoc<'_> {
        self.file.code_loc(self.nodes[id].data.range.start())
    }

    pub(crate) fn entry(&self, id: Node) -> &Entry {
        &self.nodes[id]
    }
}

/// Builds a [`SyntaxTree`]. Nodes may be adjusted while they are being built, the finished tree
/// exposes no way to mutate them.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Arena<Entry>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, data: NodeData) -> Node {
        self.nodes.alloc(Entry { data, links: Links::default() })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn data_mut(&mut self, node: Node) -> &mut NodeData {
        &mut self.nodes[node].data
    }

    pub fn push_child(&mut self, parent: Node, child: Node) {
        debug_assert!(self.nodes[child].links.parent.is_none(), "node already has a parent");

        let prev = self.nodes[parent].links.last_child;
        {
            let links = &mut self.nodes[child].links;
            links.parent = Some(parent);
            links.prev = prev;
            links.next = None;
        }
        match prev {
            Some(prev) => self.nodes[prev].links.next = Some(child),
            None => self.nodes[parent].links.first_child = Some(child),
        }

        let links = &mut self.nodes[parent].links;
        links.last_child = Some(child);
        links.child_count += 1;
    }

    pub fn push_tag(&mut self, node: Node, tag: Node) {
        debug_assert!(self.nodes[tag].links.parent.is_none(), "tag already attached");

        let prev = self.nodes[node].links.last_tag;
        {
            let links = &mut self.nodes[tag].links;
            links.parent = Some(node);
            links.prev = prev;
            links.next = None;
        }
        match prev {
            Some(prev) => self.nodes[prev].links.next = Some(tag),
            None => self.nodes[node].links.first_tag = Some(tag),
        }

        let links = &mut self.nodes[node].links;
        links.last_tag = Some(tag);
        links.tag_count += 1;
    }

    pub fn finish(self, file: SourceFile, root: Option<Node>) -> SyntaxTree {
        SyntaxTree { file, nodes: self.nodes, root }
    }
}
