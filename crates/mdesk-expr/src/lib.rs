//! Arithmetic and type expressions read out of sibling ranges of an already parsed tree.
//!
//! The tree parser knows nothing about operators: `(3 + 4) * 2` is just a paren set followed by
//! two leaves. [`parse_as_expr`] and [`parse_as_type`] give such ranges their expression
//! structure, and [`evaluate_i64`] / [`evaluate_f64`] fold them into constants.

use la_arena::{Arena, Idx};
use mdesk_errors::Diagnostics;
use mdesk_syntax::NodeRef;

mod eval;
mod parse;

pub use eval::{EvalError, evaluate_f64, evaluate_i64};
pub use parse::{parse_as_expr, parse_as_type};

pub type Expr<'t> = Idx<ExprData<'t>>;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ExprKind {
    Atom,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    /// Prefix `-`. The operand is `left`.
    Negate,
    /// `*T`. The pointee is `left`.
    Pointer,
    /// `[N]T`. The element type is `left`, the size expression `right`.
    Array,
}

impl ExprKind {
    pub(crate) fn binary(symbol: &str) -> Option<(Self, u8)> {
        Some(match symbol {
            "+" => (Self::Add, 1),
            "-" => (Self::Subtract, 1),
            "*" => (Self::Multiply, 2),
            "/" => (Self::Divide, 2),
            "%" => (Self::Modulo, 2),
            _ => return None,
        })
    }

    pub fn is_type(self) -> bool {
        matches!(self, Self::Pointer | Self::Array)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ExprData<'t> {
    pub kind: ExprKind,
    pub left: Option<Expr<'t>>,
    pub right: Option<Expr<'t>>,
    /// Text of an atom. Empty for every other kind.
    pub text: &'t str,
    /// The syntax node an atom was read from. Hand-built atoms have none.
    pub node: Option<NodeRef<'t>>,
}

/// Arena holding the expressions built from one tree.
#[derive(Debug, Default)]
pub struct ExprTree<'t> {
    exprs: Arena<ExprData<'t>>,
}

impl<'t> ExprTree<'t> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    pub fn alloc_atom(&mut self, text: &'t str) -> Expr<'t> {
        self.exprs.alloc(ExprData {
            kind: ExprKind::Atom,
            left: None,
            right: None,
            text,
            node: None,
        })
    }

    pub(crate) fn alloc_node(&mut self, node: NodeRef<'t>) -> Expr<'t> {
        self.exprs.alloc(ExprData {
            kind: ExprKind::Atom,
            left: None,
            right: None,
            text: node.string(),
            node: Some(node),
        })
    }

    pub fn alloc_binary(&mut self, kind: ExprKind, left: Expr<'t>, right: Expr<'t>) -> Expr<'t> {
        self.exprs.alloc(ExprData {
            kind,
            left: Some(left),
            right: Some(right),
            text: "",
            node: None,
        })
    }

    pub fn alloc_unary(&mut self, kind: ExprKind, operand: Expr<'t>) -> Expr<'t> {
        self.exprs.alloc(ExprData { kind, left: Some(operand), right: None, text: "", node: None })
    }

    pub fn alloc_array(&mut self, element: Expr<'t>, size: Option<Expr<'t>>) -> Expr<'t> {
        self.exprs.alloc(ExprData {
            kind: ExprKind::Array,
            left: Some(element),
            right: size,
            text: "",
            node: None,
        })
    }

    pub fn data(&self, expr: Expr<'t>) -> &ExprData<'t> {
        &self.exprs[expr]
    }

    pub fn kind(&self, expr: Expr<'t>) -> ExprKind {
        self.exprs[expr].kind
    }

    pub fn left(&self, expr: Expr<'t>) -> Option<Expr<'t>> {
        self.exprs[expr].left
    }

    pub fn right(&self, expr: Expr<'t>) -> Option<Expr<'t>> {
        self.exprs[expr].right
    }

    /// Renders `expr` fully parenthesised, e.g. `((1 * 2) + 3)` or `*[4]S32`.
    pub fn display(&self, expr: Option<Expr<'t>>) -> String {
        let mut out = String::new();
        self.write(expr, &mut out);
        out
    }

    fn write(&self, expr: Option<Expr<'t>>, out: &mut String) {
        let Some(expr) = expr else {
            out.push('_');
            return;
        };

        let data = &self.exprs[expr];
        match data.kind {
            ExprKind::Atom => out.push_str(data.text),
            ExprKind::Negate => {
                out.push('-');
                self.write(data.left, out);
            }
            ExprKind::Pointer => {
                out.push('*');
                self.write(data.left, out);
            }
            ExprKind::Array => {
                out.push('[');
                if data.right.is_some() {
                    self.write(data.right, out);
                }
                out.push(']');
                self.write(data.left, out);
            }
            kind => {
                let op = match kind {
                    ExprKind::Add => " + ",
                    ExprKind::Subtract => " - ",
                    ExprKind::Multiply => " * ",
                    ExprKind::Divide => " / ",
                    _ => " % ",
                };
                out.push('(');
                self.write(data.left, out);
                out.push_str(op);
                self.write(data.right, out);
                out.push(')');
            }
        }
    }
}

/// Structural equality of two expressions, possibly from different trees. Kinds and atom texts
/// must agree; an absent operand only matches another absent operand.
pub fn deep_match<'a, 'b>(
    a_tree: &ExprTree<'a>,
    a: Option<Expr<'a>>,
    b_tree: &ExprTree<'b>,
    b: Option<Expr<'b>>,
) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            let (a, b) = (a_tree.data(a), b_tree.data(b));
            a.kind == b.kind
                && a.text == b.text
                && deep_match(a_tree, a.left, b_tree, b.left)
                && deep_match(a_tree, a.right, b_tree, b.right)
        }
        _ => false,
    }
}

/// Result of reading an expression or type out of a sibling range.
#[derive(Debug)]
pub struct ExprParse<'t> {
    tree: ExprTree<'t>,
    root: Option<Expr<'t>>,
    diagnostics: Diagnostics,
}

impl<'t> ExprParse<'t> {
    pub fn tree(&self) -> &ExprTree<'t> {
        &self.tree
    }

    /// `None` when nothing could be built from the range.
    pub fn root(&self) -> Option<Expr<'t>> {
        self.root
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_parts(self) -> (ExprTree<'t>, Option<Expr<'t>>, Diagnostics) {
        (self.tree, self.root, self.diagnostics)
    }
}
