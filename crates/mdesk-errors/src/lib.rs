use std::fmt::Display;

pub use annotate_snippets::Renderer;
use annotate_snippets::{Level, Snippet};
use mdesk_inputs::{CodeLoc, SourceFile};
use mdesk_syntax::{Node, SyntaxTree};
pub use text_size::TextRange;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    fn level(self) -> Level {
        match self {
            Severity::Error => Level::Error,
            Severity::Warning => Level::Warning,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    severity: Severity,
    message: String,
    range: TextRange,
    node: Option<Node>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, range: TextRange) -> Self {
        Self { severity: Severity::Error, message: message.into(), range, node: None }
    }

    pub fn warning(message: impl Into<String>, range: TextRange) -> Self {
        Self { severity: Severity::Warning, message: message.into(), range, node: None }
    }

    /// Anchors the diagnostic on the node it is about.
    pub fn with_node(mut self, node: Node) -> Self {
        self.node = Some(node);
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn node(&self) -> Option<Node> {
        self.node
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Line and column where the range starts. The range lies inside the owning node, or is
    /// next to it when the problem is what follows the node.
    pub fn location<'t>(&self, tree: &'t SyntaxTree) -> CodeLoc<'t> {
        tree.file().code_loc(self.range.start())
    }

    pub fn render<'a>(&'a self, renderer: &'a Renderer, file: &'a SourceFile) -> impl Display + 'a {
        let text = file.text();
        let end = self.range.end().min(file.len());
        let span = usize::from(self.range.start().min(end))..usize::from(end);

        let level = self.severity.level();
        let message = level.title(&self.message).snippet(
            Snippet::source(text)
                .origin(file.path().as_str())
                .annotation(level.span(span).label("here"))
                .fold(true),
        );
        renderer.render(message)
    }
}

/// Diagnostics in the order they were reported. Nothing is ever removed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn error(&mut self, message: impl Into<String>, range: TextRange) {
        self.push(Diagnostic::error(message, range));
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    pub fn first(&self) -> Option<&Diagnostic> {
        self.items.first()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use text_size::TextSize;

    use super::*;

    #[test]
    fn renders_with_origin_and_label() {
        let file = SourceFile::new("demo.mdesk", b"foo: {\n  bar\n".to_vec());
        let range = TextRange::at(TextSize::new(5), TextSize::new(1));
        let diagnostic = Diagnostic::error("unterminated set", range);

        let rendered = diagnostic.render(&Renderer::plain(), &file).to_string();
        assert!(rendered.contains("error: unterminated set"), "{rendered}");
        assert!(rendered.contains("demo.mdesk:1:6"), "{rendered}");
        assert!(rendered.contains("here"), "{rendered}");
    }

    #[test]
    fn ranges_past_the_end_are_clamped() {
        let file = SourceFile::new("short", b"ab".to_vec());
        let range = TextRange::new(TextSize::new(1), TextSize::new(9));
        let diagnostic = Diagnostic::warning("odd", range);

        let rendered = diagnostic.render(&Renderer::plain(), &file).to_string();
        assert!(rendered.contains("warning: odd"), "{rendered}");
    }

    #[test]
    fn diagnostics_keep_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::warning("first", TextRange::default()));
        assert!(!diagnostics.has_errors());

        diagnostics.error("second", TextRange::default());
        assert!(diagnostics.has_errors());

        let messages: Vec<_> = diagnostics.iter().map(Diagnostic::message).collect();
        assert_eq!(messages, ["first", "second"]);
        assert_eq!(diagnostics.first().map(Diagnostic::message), Some("first"));
    }
}
