use std::fmt;
use std::ops::BitOr;

use mdesk_inputs::CodeLoc;
use text_size::TextRange;

use crate::tree::{Links, Node, NodeData, NodeKind, SyntaxTree};
use crate::{FlagSet, NodeFlag, NodeFlags};

/// A borrowed handle to one node of a [`SyntaxTree`].
///
/// Absent nodes are `None` rather than a shared sentinel; two handles are equal only when they
/// name the same node of the same tree.
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t SyntaxTree,
    id: Node,
}

impl<'t> NodeRef<'t> {
    pub(crate) fn new(tree: &'t SyntaxTree, id: Node) -> Self {
        Self { tree, id }
    }

    pub fn id(self) -> Node {
        self.id
    }

    pub fn tree(self) -> &'t SyntaxTree {
        self.tree
    }

    fn data(self) -> &'t NodeData {
        &self.tree.entry(self.id).data
    }

    fn links(self) -> &'t Links {
        &self.tree.entry(self.id).links
    }

    fn lift(self, id: Option<Node>) -> Option<Self> {
        id.map(|id| Self::new(self.tree, id))
    }

    pub fn kind(self) -> NodeKind {
        self.data().kind
    }

    pub fn flags(self) -> NodeFlags {
        self.data().flags
    }

    pub fn has_flag(self, flag: NodeFlag) -> bool {
        self.data().flags.contains(flag)
    }

    pub fn string(self) -> &'t str {
        &self.data().string
    }

    pub fn raw_string(self) -> &'t str {
        &self.data().raw_string
    }

    pub fn raw_bytes(self) -> &'t [u8] {
        &self.data().raw_bytes
    }

    pub fn range(self) -> TextRange {
        self.data().range
    }

    pub fn pre_comment(self) -> &'t str {
        &self.data().pre_comment
    }

    pub fn post_comment(self) -> &'t str {
        &self.data().post_comment
    }

    pub fn code_loc(self) -> CodeLoc<'t> {
        self.tree.code_loc(self.id)
    }

    /// For a tag this is the node it decorates.
    pub fn parent(self) -> Option<Self> {
        self.lift(self.links().parent)
    }

    pub fn first_child(self) -> Option<Self> {
        self.lift(self.links().first_child)
    }

    pub fn last_child(self) -> Option<Self> {
        self.lift(self.links().last_child)
    }

    pub fn next_sibling(self) -> Option<Self> {
        self.lift(self.links().next)
    }

    pub fn prev_sibling(self) -> Option<Self> {
        self.lift(self.links().prev)
    }

    pub fn first_tag(self) -> Option<Self> {
        self.lift(self.links().first_tag)
    }

    pub fn children(self) -> impl Iterator<Item = NodeRef<'t>> {
        std::iter::successors(self.first_child(), |node| node.next_sibling())
    }

    pub fn tags(self) -> impl Iterator<Item = NodeRef<'t>> {
        std::iter::successors(self.first_tag(), |node| node.next_sibling())
    }

    /// Iterates from this node through its following siblings.
    pub fn siblings(self) -> impl Iterator<Item = NodeRef<'t>> {
        std::iter::successors(Some(self), |node| node.next_sibling())
    }

    pub fn child_count(self) -> usize {
        self.links().child_count as usize
    }

    pub fn tag_count(self) -> usize {
        self.links().tag_count as usize
    }

    pub fn is_leaf(self) -> bool {
        self.links().first_child.is_none()
    }

    pub fn child_by_name(self, name: &str) -> Option<Self> {
        self.children().find(|child| child.string() == name)
    }

    pub fn tag_by_name(self, name: &str) -> Option<Self> {
        self.tags().find(|tag| tag.string() == name)
    }

    pub fn has_tag(self, name: &str) -> bool {
        self.tag_by_name(name).is_some()
    }

    /// Whether a tag called `name` is attached whose argument strings are exactly `arguments`.
    pub fn has_tag_with_arguments(self, name: &str, arguments: &[&str]) -> bool {
        self.tags().any(|tag| {
            tag.string() == name
                && tag.child_count() == arguments.len()
                && tag.children().zip(arguments).all(|(arg, &expected)| arg.string() == expected)
        })
    }

    /// First node in `self..until` carrying any flag of `flags`. `until` is exclusive; `None`
    /// runs to the end of the sibling list.
    pub fn find_with_flags(self, until: Option<Self>, flags: FlagSet) -> Option<Self> {
        self.siblings()
            .take_while(|node| Some(*node) != until)
            .find(|node| node.flags().intersects(&flags))
    }

    /// First node in `self..until` carrying none of `flags`.
    pub fn find_without_flags(self, until: Option<Self>, flags: FlagSet) -> Option<Self> {
        self.siblings()
            .take_while(|node| Some(*node) != until)
            .find(|node| !node.flags().intersects(&flags))
    }

    /// Compares kind and string, plus tags when `flags` asks for them. Children are ignored.
    pub fn shallow_match(self, other: NodeRef<'_>, flags: MatchFlags) -> bool {
        if self.kind() != other.kind() || self.string() != other.string() {
            return false;
        }

        if flags.contains(MatchFlags::TAGS) {
            if self.tag_count() != other.tag_count() {
                return false;
            }

            for (tag, other_tag) in self.tags().zip(other.tags()) {
                if tag.string() != other_tag.string() {
                    return false;
                }

                if flags.contains(MatchFlags::TAG_ARGUMENTS) {
                    if tag.child_count() != other_tag.child_count() {
                        return false;
                    }

                    let args_match = tag
                        .children()
                        .zip(other_tag.children())
                        .all(|(arg, other_arg)| arg.deep_match(other_arg, flags));
                    if !args_match {
                        return false;
                    }
                }
            }
        }

        true
    }

    /// Recursive structural comparison. Flags and source positions are not compared.
    pub fn deep_match(self, other: NodeRef<'_>, flags: MatchFlags) -> bool {
        self.shallow_match(other, flags)
            && self.child_count() == other.child_count()
            && self.children().zip(other.children()).all(|(a, b)| a.deep_match(b, flags))
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("string", &self.string())
            .finish()
    }
}

/// Strictness of [`NodeRef::deep_match`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchFlags(u8);

impl MatchFlags {
    pub const NONE: Self = Self(0);
    pub const TAGS: Self = Self(1 << 0);
    /// Only meaningful together with [`MatchFlags::TAGS`].
    pub const TAG_ARGUMENTS: Self = Self(1 << 1);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for MatchFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use mdesk_inputs::SourceFile;

    use super::*;
    use crate::{LiteralKind, Separator, TreeBuilder};

    fn leaf(builder: &mut TreeBuilder, parent: Node, text: &str) -> Node {
        let mut data = NodeData::new(NodeKind::Main, text);
        data.flags = NodeFlags::literal(LiteralKind::Identifier);
        let node = builder.alloc(data);
        builder.push_child(parent, node);
        node
    }

    fn detached(builder: TreeBuilder, root: Node) -> SyntaxTree {
        builder.finish(SourceFile::new("<test>", Vec::new()), Some(root))
    }

    #[test]
    fn links_follow_insertion_order() {
        let mut builder = TreeBuilder::new();
        let root = builder.alloc(NodeData::new(NodeKind::Main, ""));
        for text in ["a", "b", "c"] {
            leaf(&mut builder, root, text);
        }
        let tree = detached(builder, root);
        let root = tree.root().unwrap();

        let names: Vec<_> = root.children().map(|node| node.string()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(root.child_count(), 3);
        assert_eq!(root.last_child().unwrap().string(), "c");
        assert_eq!(root.last_child().unwrap().prev_sibling().unwrap().string(), "b");
        assert!(root.children().all(|child| child.parent() == Some(root)));
    }

    #[test]
    fn tags_are_kept_apart_from_children() {
        let mut builder = TreeBuilder::new();
        let root = builder.alloc(NodeData::new(NodeKind::Main, "foo"));
        let tag = builder.alloc(NodeData::new(NodeKind::Tag, "size"));
        builder.push_tag(root, tag);
        leaf(&mut builder, tag, "4");
        leaf(&mut builder, root, "x");
        let tree = detached(builder, root);
        let root = tree.root().unwrap();

        assert_eq!(root.child_count(), 1);
        assert_eq!(root.tag_count(), 1);
        assert!(root.has_tag("size"));
        assert!(!root.has_tag("x"));
        assert!(root.has_tag_with_arguments("size", &["4"]));
        assert!(!root.has_tag_with_arguments("size", &[]));
        assert_eq!(root.first_tag().unwrap().parent(), Some(root));
    }

    #[test]
    fn find_with_flags_stops_at_the_bound() {
        let mut builder = TreeBuilder::new();
        let root = builder.alloc(NodeData::new(NodeKind::Main, ""));
        let nodes: Vec<_> =
            ["x", "y", "a", "b"].iter().map(|t| leaf(&mut builder, root, t)).collect();
        builder.data_mut(nodes[1]).flags.followed_by = Some(Separator::Semicolon);
        builder.data_mut(nodes[2]).flags.preceded_by = Some(Separator::Semicolon);
        let tree = detached(builder, root);

        let x = tree.node(nodes[0]);
        let a = tree.node(nodes[2]);
        let b = tree.node(nodes[3]);

        assert_eq!(x.find_with_flags(None, FlagSet::AFTER_SEPARATOR), Some(a));
        assert_eq!(x.find_with_flags(Some(a), FlagSet::AFTER_SEPARATOR), None);
        assert_eq!(b.find_with_flags(None, FlagSet::AFTER_SEPARATOR), None);
        assert_eq!(a.find_without_flags(None, FlagSet::AFTER_SEPARATOR), Some(b));
    }

    #[test]
    fn deep_match_respects_strictness() {
        let build = |tag: &str| {
            let mut builder = TreeBuilder::new();
            let root = builder.alloc(NodeData::new(NodeKind::Main, "foo"));
            let tag = builder.alloc(NodeData::new(NodeKind::Tag, tag));
            builder.push_tag(root, tag);
            leaf(&mut builder, root, "a");
            detached(builder, root)
        };

        let left = build("x");
        let right = build("y");
        let (l, r) = (left.root().unwrap(), right.root().unwrap());

        assert!(l.deep_match(r, MatchFlags::NONE));
        assert!(!l.deep_match(r, MatchFlags::TAGS));
        assert!(l.deep_match(l, MatchFlags::TAGS | MatchFlags::TAG_ARGUMENTS));
        assert_ne!(l, r);
    }
}
