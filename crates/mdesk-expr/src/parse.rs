use mdesk_errors::{Diagnostic, Diagnostics};
use mdesk_syntax::{Delimiter, LiteralKind, NodeKind, NodeRef};

use crate::{Expr, ExprKind, ExprParse, ExprTree};

/// Deepest nesting of sets and prefix operators that is parsed.
const MAX_DEPTH: u32 = 128;

/// Reads `first..=last` as an arithmetic expression. `*` `/` `%` bind tighter than `+` `-`, and
/// an unlabeled paren set stands for its parenthesised contents.
pub fn parse_as_expr<'t>(first: NodeRef<'t>, last: NodeRef<'t>) -> ExprParse<'t> {
    tracing::debug!(first = first.string(), last = last.string(), "parse expression");
    run(first, last, Grammar::Expr)
}

/// Reads `first..=last` as a type: `*T` is a pointer, `[N]T` an array of `N` elements, and
/// anything else a single atom.
pub fn parse_as_type<'t>(first: NodeRef<'t>, last: NodeRef<'t>) -> ExprParse<'t> {
    tracing::debug!(first = first.string(), last = last.string(), "parse type");
    run(first, last, Grammar::Type)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Grammar {
    Expr,
    Type,
}

fn run<'t>(first: NodeRef<'t>, last: NodeRef<'t>, grammar: Grammar) -> ExprParse<'t> {
    let mut tree = ExprTree::new();
    let mut diagnostics = Diagnostics::new();

    let what = match grammar {
        Grammar::Expr => "expression",
        Grammar::Type => "type",
    };
    let root = ExprParser::new(range(first, last), first, &mut tree, &mut diagnostics)
        .parse_all(grammar, |node| format!("unexpected `{node}` after {what}"));

    ExprParse { tree, root, diagnostics }
}

/// Siblings from `first` through `last`. A `last` that does not follow `first` extends the range
/// to the end of the sibling list.
fn range<'t>(first: NodeRef<'t>, last: NodeRef<'t>) -> Vec<NodeRef<'t>> {
    let mut nodes = Vec::new();
    for node in first.siblings() {
        nodes.push(node);
        if node == last {
            break;
        }
    }
    nodes
}

struct ExprParser<'t, 'a> {
    nodes: Vec<NodeRef<'t>>,
    pos: usize,
    /// Where "missing" problems are reported when the range runs out.
    anchor: NodeRef<'t>,
    depth: u32,
    tree: &'a mut ExprTree<'t>,
    diagnostics: &'a mut Diagnostics,
}

impl<'t, 'a> ExprParser<'t, 'a> {
    fn new(
        nodes: Vec<NodeRef<'t>>,
        anchor: NodeRef<'t>,
        tree: &'a mut ExprTree<'t>,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self { nodes, pos: 0, anchor, depth: 0, tree, diagnostics }
    }

    /// A parser over the children of `set`, sharing this parser's output.
    fn nested<'b>(&'b mut self, set: NodeRef<'t>) -> Option<ExprParser<'t, 'b>> {
        if !self.can_nest(set) {
            return None;
        }
        let depth = self.depth + 1;
        let mut parser =
            ExprParser::new(set.children().collect(), set, &mut *self.tree, &mut *self.diagnostics);
        parser.depth = depth;
        Some(parser)
    }

    /// Runs `f` one level deeper.
    fn deeper(
        &mut self,
        node: NodeRef<'t>,
        f: impl FnOnce(&mut Self) -> Option<Expr<'t>>,
    ) -> Option<Expr<'t>> {
        if !self.can_nest(node) {
            return None;
        }
        self.depth += 1;
        let expr = f(self);
        self.depth -= 1;
        expr
    }

    /// Past the depth limit the rest of the range is dropped with a single diagnostic.
    fn can_nest(&mut self, node: NodeRef<'t>) -> bool {
        if self.depth < MAX_DEPTH {
            return true;
        }
        self.error("expression nested too deeply", node);
        self.pos = self.nodes.len();
        false
    }

    fn current(&self) -> Option<NodeRef<'t>> {
        self.nodes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<NodeRef<'t>> {
        let node = self.current()?;
        self.pos += 1;
        self.anchor = node;
        Some(node)
    }

    fn error(&mut self, message: impl Into<String>, node: NodeRef<'t>) {
        self.diagnostics.push(Diagnostic::error(message, node.range()).with_node(node.id()));
    }

    fn at_operator(&self, symbol: &str) -> bool {
        self.current().is_some_and(|node| operator(node) == Some(symbol))
    }

    fn parse(&mut self, grammar: Grammar) -> Option<Expr<'t>> {
        match grammar {
            Grammar::Expr => self.expr(0),
            Grammar::Type => self.type_(),
        }
    }

    /// Parses the whole range. Nodes left over after a successful parse are reported once.
    fn parse_all(
        mut self,
        grammar: Grammar,
        leftover: impl FnOnce(&str) -> String,
    ) -> Option<Expr<'t>> {
        let expr = self.parse(grammar)?;
        if let Some(node) = self.current() {
            self.error(leftover(node.raw_string()), node);
        }
        Some(expr)
    }

    fn expr(&mut self, min_precedence: u8) -> Option<Expr<'t>> {
        let mut lhs = self.unary()?;

        while let Some((kind, precedence)) =
            self.current().and_then(operator).and_then(ExprKind::binary)
        {
            if precedence < min_precedence {
                break;
            }
            let Some(op) = self.bump() else { break };
            if self.current().is_none() {
                self.error(format!("expected an operand after `{}`", op.string()), op);
                break;
            }

            let Some(rhs) = self.expr(precedence + 1) else { break };
            lhs = self.tree.alloc_binary(kind, lhs, rhs);
        }

        Some(lhs)
    }

    fn unary(&mut self) -> Option<Expr<'t>> {
        if self.at_operator("-") {
            let op = self.bump()?;
            if self.current().is_none() {
                self.error("expected an operand after `-`", op);
                return None;
            }

            let operand = self.deeper(op, |p| p.unary())?;
            return Some(self.tree.alloc_unary(ExprKind::Negate, operand));
        }

        self.primary()
    }

    fn primary(&mut self) -> Option<Expr<'t>> {
        let Some(node) = self.current() else {
            let anchor = self.anchor;
            self.error("expected expression", anchor);
            return None;
        };

        if let Some(symbol) = operator(node) {
            self.bump();
            self.error(format!("unexpected operator `{symbol}`"), node);
            return None;
        }

        self.bump();
        match unlabeled_set(node) {
            Some(Delimiter::Paren) => self.parenthesised(node, Grammar::Expr),
            Some(_) => {
                self.error("expected expression, found a set", node);
                None
            }
            None => self.atom(node),
        }
    }

    fn type_(&mut self) -> Option<Expr<'t>> {
        let Some(node) = self.current() else {
            let anchor = self.anchor;
            self.error("expected a type", anchor);
            return None;
        };

        if operator(node) == Some("*") {
            self.bump();
            let pointee = self.deeper(node, |p| p.type_())?;
            return Some(self.tree.alloc_unary(ExprKind::Pointer, pointee));
        }

        self.bump();
        match unlabeled_set(node) {
            Some(Delimiter::Bracket) => {
                let size = if node.is_leaf() {
                    None
                } else {
                    self.nested(node)?.parse_all(Grammar::Expr, |found| {
                        format!("expected `]` after the array size, found `{found}`")
                    })
                };
                let element = self.deeper(node, |p| p.type_())?;
                Some(self.tree.alloc_array(element, size))
            }
            Some(Delimiter::Paren) => self.parenthesised(node, Grammar::Type),
            Some(Delimiter::Brace) => {
                self.error("expected a type, found a set", node);
                None
            }
            None if operator(node).is_some() => {
                self.error(format!("unexpected operator `{}`", node.string()), node);
                None
            }
            None => self.atom(node),
        }
    }

    fn parenthesised(&mut self, set: NodeRef<'t>, grammar: Grammar) -> Option<Expr<'t>> {
        if set.is_leaf() {
            self.error("empty parentheses", set);
            return None;
        }
        self.nested(set)?.parse_all(grammar, |found| format!("expected `)`, found `{found}`"))
    }

    fn atom(&mut self, node: NodeRef<'t>) -> Option<Expr<'t>> {
        if node.kind() == NodeKind::Error {
            return None;
        }
        if !node.is_leaf() {
            self.error(format!("expected an atom, found the set `{}`", node.string()), node);
            return None;
        }
        Some(self.tree.alloc_node(node))
    }
}

/// The operator a symbol leaf spells, if any.
fn operator(node: NodeRef<'_>) -> Option<&str> {
    let is_symbol = node.flags().literal == Some(LiteralKind::Symbol) && node.is_leaf();
    let symbol = node.string();
    (is_symbol && matches!(symbol, "+" | "-" | "*" | "/" | "%")).then_some(symbol)
}

fn unlabeled_set(node: NodeRef<'_>) -> Option<Delimiter> {
    let flags = node.flags();
    if node.kind() == NodeKind::Main && flags.literal.is_none() {
        flags.open
    } else {
        None
    }
}
