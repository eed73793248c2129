use mdesk_syntax::{Node, NodeKind, TokenKind};

use crate::parser::Parser;

mod sets;
mod tags;

pub(crate) use sets::{entries, labeled, scoped_set};

/// Where a node is being parsed. Unscoped sets end at line breaks and may not contain unlabeled
/// sets; top-level and scoped sets only end at their closer or the end of input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Context {
    Top,
    Scoped,
    Unscoped,
}

/// Parses one node with its tags. Nothing is consumed and `None` is returned when the current
/// token is a closer, a separator, or the end of input.
pub(crate) fn node(p: &mut Parser<'_>, ctx: Context) -> Option<Node> {
    let pre_comment = p.leading_comment();
    let tags = tags::tags(p);

    let node = if p.at_label() {
        labeled(p)
    } else if let Some(open) = p.at_open() {
        let m = p.start();
        // Only a labeled set may sit inside an unscoped one, so a member type such as
        // `e: *[100]F32` has to be written `e: (*[100]F32)`.
        if ctx == Context::Unscoped {
            let message = if tags.is_empty() {
                "unlabeled set inside an unscoped set"
            } else {
                "tagged unlabeled set inside an unscoped set"
            };
            p.error_at(message, p.current().range, m.node());
        }
        let kind = scoped_set(p, m.node(), open);
        m.complete(p, kind)
    } else if p.at_eof() || p.at_close().is_some() || p.at_separator().is_some() {
        if tags.is_empty() {
            return None;
        }

        // Stray `@`s were reported already.
        let m = p.start();
        if tags.iter().any(|&tag| p.data_mut(tag).kind == NodeKind::Tag) {
            p.error_at("expected a node after tags", p.current().range, m.node());
        }
        m.complete(p, NodeKind::Error)
    } else {
        unexpected(p)
    };

    p.data_mut(node).pre_comment = pre_comment;
    for tag in tags {
        p.builder().push_tag(node, tag);
    }
    Some(node)
}

/// Consumes the current token into an error node.
pub(crate) fn unexpected(p: &mut Parser<'_>) -> Node {
    let m = p.start();
    let token = p.bump();
    let text = p.text(token.range);

    let message = match token.kind {
        TokenKind::EOF => "unexpected end of input".to_owned(),
        _ => format!("unexpected `{text}`"),
    };
    p.error_at(message, token.range, m.node());
    let raw = p.raw(token.range);
    let data = p.data_mut(m.node());
    data.string = text.into();
    data.raw_string = text.into();
    data.raw_bytes = raw.into();
    m.complete(p, NodeKind::Error)
}

