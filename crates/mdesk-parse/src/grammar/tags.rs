use mdesk_syntax::{Delimiter, Node, NodeKind};

use super::scoped_set;
use crate::parser::Parser;

/// `@name` or `@name(arguments)`. Arguments are only taken when `(` touches the name. An `@`
/// without a name becomes an `Error` entry in the returned list.
pub(super) fn tags(p: &mut Parser<'_>) -> Vec<Node> {
    let mut tags = Vec::new();

    while p.at(b'@') {
        let at = p.bump();
        let m = p.start_from(at.range.start());
        if !p.at_label() {
            p.error_at("expected a tag name after `@`", at.range, m.node());
            let data = p.data_mut(m.node());
            data.string = "@".into();
            data.raw_string = "@".into();
            data.raw_bytes = b"@".as_slice().into();
            tags.push(m.complete(p, NodeKind::Error));
            continue;
        }

        let name = p.bump();
        p.set_label(m.node(), name);

        if p.at(b'(') && p.is_adjacent() {
            scoped_set(p, m.node(), Delimiter::Paren);
        }
        tags.push(m.complete(p, NodeKind::Tag));
    }

    tags
}
