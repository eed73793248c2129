use std::fmt::Write as _;

use crate::node::NodeRef;
use crate::tree::SyntaxTree;

impl SyntaxTree {
    /// Indented text rendering of the whole tree, one node per line. Tags are listed before
    /// children.
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.root() {
            dump_node(root, 0, &mut out);
        }
        out
    }
}

impl NodeRef<'_> {
    pub fn debug_dump(self) -> String {
        let mut out = String::new();
        dump_node(self, 0, &mut out);
        out
    }
}

fn dump_node(node: NodeRef<'_>, depth: usize, out: &mut String) {
    _ = write!(out, "{:indent$}{:?} {:?}", "", node.kind(), node.string(), indent = depth * 2);

    let flags = node.flags().to_set();
    if !flags.is_empty() {
        let names = flags.iter().map(|flag| format!("{flag:?}")).collect::<Vec<_>>();
        _ = write!(out, " [{}]", names.join(", "));
    }
    if !node.pre_comment().is_empty() {
        _ = write!(out, " pre={:?}", node.pre_comment());
    }
    if !node.post_comment().is_empty() {
        _ = write!(out, " post={:?}", node.post_comment());
    }
    out.push('\n');

    for tag in node.tags() {
        dump_node(tag, depth + 1, out);
    }
    for child in node.children() {
        dump_node(child, depth + 1, out);
    }
}
