use mdesk_syntax::{Delimiter, Node, NodeKind, Separator};
use text_size::TextRange;

use super::{Context, node, unexpected};
use crate::parser::Parser;

/// `label`, `label: { ... }` or `label: entries up to the end of the line`.
pub(crate) fn labeled(p: &mut Parser<'_>) -> Node {
    let m = p.start();
    let label = p.bump();
    p.set_label(m.node(), label);

    if !p.at(b':') || p.newlines_before() > 0 {
        return m.complete(p, NodeKind::Main);
    }
    p.bump();

    match p.at_open() {
        Some(open) if p.newlines_before() < 2 => {
            let kind = scoped_set(p, m.node(), open);
            let node = m.complete(p, kind);
            if p.is_adjacent() && p.at_node_start() {
                p.error_at("expected whitespace after a labeled set", p.current().range, node);
            }
            node
        }
        _ => {
            let kind = unscoped_set(p, m.node(), label.range);
            m.complete(p, kind)
        }
    }
}

/// Parses `open entries close` into the children of `parent`. The closer may be any bracket.
/// Returns the kind `parent` should be completed with.
pub(crate) fn scoped_set(p: &mut Parser<'_>, parent: Node, open: Delimiter) -> NodeKind {
    let open_range = p.bump().range;
    p.data_mut(parent).flags.open = Some(open);

    if !p.enter_set() {
        p.error_at("sets nested too deeply", open_range, parent);
        skip_nested(p, 1);
        return NodeKind::Error;
    }
    entries(p, parent, Context::Scoped);
    p.leave_set();

    match p.at_close() {
        Some(close) => {
            p.bump();
            p.data_mut(parent).flags.close = Some(close);
        }
        None => p.error_at("unterminated set", open_range, parent),
    }
    NodeKind::Main
}

/// Entries of a scoped set or of the whole document, optionally split by `,` or `;`.
pub(crate) fn entries(p: &mut Parser<'_>, parent: Node, ctx: Context) {
    let mut previous = None;
    let mut pending = None::<Separator>;

    loop {
        if p.at_eof() || (ctx == Context::Scoped && p.at_close().is_some()) {
            break;
        }

        if let Some(separator) = p.at_separator() {
            match previous.take() {
                Some(before) => {
                    p.bump();
                    p.attach_trailing_comment(before);
                    p.data_mut(before).flags.followed_by = Some(separator);
                    pending = Some(separator);
                }
                None => {
                    let error = unexpected(p);
                    p.push_child(parent, error);
                }
            }
            continue;
        }

        let child = match node(p, ctx) {
            Some(child) => child,
            None => unexpected(p),
        };
        if let Some(separator) = pending.take() {
            p.data_mut(child).flags.preceded_by = Some(separator);
        }
        p.push_child(parent, child);
        previous = Some(child);
    }
}

fn unscoped_set(p: &mut Parser<'_>, parent: Node, label: TextRange) -> NodeKind {
    if p.newlines_before() >= 2 || at_unscoped_end(p) {
        p.error_at("label has no content", label, parent);
        return NodeKind::Main;
    }

    if !p.enter_set() {
        p.error_at("sets nested too deeply", label, parent);
        skip_nested(p, 0);
        return NodeKind::Error;
    }
    while let Some(child) = node(p, Context::Unscoped) {
        p.push_child(parent, child);
        if p.newlines_before() > 0 || at_unscoped_end(p) {
            break;
        }
    }
    p.leave_set();
    NodeKind::Main
}

/// Skips the rest of a set without building nodes. `depth` counts the brackets already opened:
/// a scoped set ends at its matching closer, an unscoped one (`depth == 0`) where its entries
/// would.
fn skip_nested(p: &mut Parser<'_>, mut depth: u32) {
    let scoped = depth > 0;
    while !p.at_eof() {
        if depth == 0 && at_unscoped_end(p) {
            break;
        }
        if p.at_open().is_some() {
            depth += 1;
        } else if p.at_close().is_some() {
            depth -= 1;
        }
        p.bump();
        if depth == 0 && (scoped || p.newlines_before() > 0) {
            break;
        }
    }
}

fn at_unscoped_end(p: &Parser<'_>) -> bool {
    p.at_eof() || p.at_close().is_some() || p.at_separator().is_some()
}
