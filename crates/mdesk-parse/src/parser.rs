use drop_bomb::DropBomb;
use mdesk_errors::{Diagnostic, Diagnostics};
use mdesk_inputs::SourceFile;
use mdesk_syntax::{
    Delimiter, LiteralKind, Node, NodeData, NodeKind, NodeFlags, Separator, TokenKind, TreeBuilder,
};
use mdesk_tokenizer::{Token, TokenError, comment_body, decode_string, literal_body, token_at};
use text_size::{TextRange, TextSize};

/// Symbols that are syntax wherever they appear outside a string literal.
const RESERVED: &[u8] = b"{}()[],;:@#\\";

/// Deepest set nesting that is parsed. Anything below is skipped as a single error.
const MAX_DEPTH: u32 = 128;

/// Trivia between two significant tokens.
#[derive(Clone, Copy, Debug, Default)]
struct Trivia {
    start: TextSize,
    newlines: u32,
    /// First comment before any line break, attached to the node that ends before it.
    trailing: Option<Token>,
    /// Last comment that does not share a line with the previous token, and the number of line
    /// breaks that follow it.
    leading: Option<(Token, u32)>,
}

pub(crate) struct Parser<'a> {
    file: &'a SourceFile,
    token: Token,
    trivia: Trivia,
    prev_end: TextSize,
    at_start: bool,
    trailing_claimed: bool,
    depth: u32,
    builder: TreeBuilder,
    diagnostics: Diagnostics,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(file: &'a SourceFile, offset: TextSize) -> Self {
        let offset = offset.min(file.len());
        let mut parser = Self {
            file,
            token: token_at(file.bytes(), offset),
            trivia: Trivia::default(),
            prev_end: offset,
            at_start: true,
            trailing_claimed: false,
            depth: 0,
            builder: TreeBuilder::new(),
            diagnostics: Diagnostics::new(),
        };
        parser.skip_trivia(offset);
        parser
    }

    pub(crate) fn current(&self) -> Token {
        self.token
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.token.kind == TokenKind::EOF
    }

    pub(crate) fn symbol(&self) -> Option<u8> {
        self.token.symbol(self.file.bytes())
    }

    pub(crate) fn at(&self, byte: u8) -> bool {
        self.symbol() == Some(byte)
    }

    pub(crate) fn at_open(&self) -> Option<Delimiter> {
        self.symbol().and_then(Delimiter::from_open)
    }

    pub(crate) fn at_close(&self) -> Option<Delimiter> {
        self.symbol().and_then(Delimiter::from_close)
    }

    pub(crate) fn at_separator(&self) -> Option<Separator> {
        self.symbol().and_then(Separator::from_byte)
    }

    /// Whether the current token can be the label of a node.
    pub(crate) fn at_label(&self) -> bool {
        match self.token.kind {
            TokenKind::IDENTIFIER | TokenKind::NUMERIC_LITERAL | TokenKind::STRING_LITERAL => true,
            TokenKind::SYMBOL => !self.symbol().is_some_and(|byte| RESERVED.contains(&byte)),
            _ => false,
        }
    }

    /// Whether the current token can begin a node, tags included.
    pub(crate) fn at_node_start(&self) -> bool {
        self.at_label() || self.at_open().is_some() || self.at(b'@')
    }

    /// Line breaks between the previous token and the current one.
    pub(crate) fn newlines_before(&self) -> u32 {
        self.trivia.newlines
    }

    /// The current token directly follows the previous one.
    pub(crate) fn is_adjacent(&self) -> bool {
        !self.at_start && self.trivia.start == self.token.range.start()
    }

    pub(crate) fn text(&self, range: TextRange) -> &'a str {
        self.file.text().get(std::ops::Range::<usize>::from(range)).unwrap_or_default()
    }

    pub(crate) fn raw(&self, range: TextRange) -> &'a [u8] {
        self.file.bytes().get(std::ops::Range::<usize>::from(range)).unwrap_or_default()
    }

    /// Consumes the current token. At the end of input this is a no-op.
    pub(crate) fn bump(&mut self) -> Token {
        let token = self.token;
        if token.kind == TokenKind::EOF {
            return token;
        }

        self.prev_end = token.end();
        self.at_start = false;
        self.trailing_claimed = false;
        self.skip_trivia(token.end());
        token
    }

    fn skip_trivia(&mut self, mut offset: TextSize) {
        let bytes = self.file.bytes();
        let mut trivia = Trivia { start: offset, ..Trivia::default() };

        loop {
            let token = token_at(bytes, offset);
            match token.kind {
                TokenKind::WHITESPACE => {
                    let newlines =
                        token.text(bytes).iter().filter(|&&byte| byte == b'\n').count() as u32;
                    trivia.newlines += newlines;
                    if let Some((_, after)) = &mut trivia.leading {
                        *after += newlines;
                    }
                }
                TokenKind::COMMENT => {
                    self.report_token_error(&token, None);
                    if trivia.newlines == 0 && !self.at_start {
                        trivia.trailing.get_or_insert(token);
                    } else {
                        trivia.leading = Some((token, 0));
                    }
                }
                TokenKind::BAD_CHARACTER => self.report_token_error(&token, None),
                _ => {
                    self.token = token;
                    self.trivia = trivia;
                    return;
                }
            }
            offset = token.end();
        }
    }

    /// Enters a nested set. Returns `false`, leaving the depth unchanged, once sets are nested
    /// too deeply.
    pub(crate) fn enter_set(&mut self) -> bool {
        if self.depth >= MAX_DEPTH {
            return false;
        }
        self.depth += 1;
        true
    }

    pub(crate) fn leave_set(&mut self) {
        self.depth -= 1;
    }

    /// Reports a lexical error. Errors found in trivia get an `Error` node of their own that is
    /// not linked into the tree.
    fn report_token_error(&mut self, token: &Token, node: Option<Node>) {
        let Some(error) = token.error else { return };
        let node = node.unwrap_or_else(|| self.detached_error(token));

        let len = match error {
            TokenError::UnterminatedComment => 2,
            TokenError::UnterminatedString => {
                token.string_style.map_or(1, |style| style.delimiter_len())
            }
            TokenError::InvalidByte | TokenError::ControlCharacter => {
                usize::from(token.range.len())
            }
        };
        let len = TextSize::new(len as u32).min(token.range.len());
        let range = TextRange::at(token.range.start(), len);
        self.error_at(error.message(), range, node);
    }

    fn detached_error(&mut self, token: &Token) -> Node {
        let mut data = NodeData::new(NodeKind::Error, self.text(token.range));
        data.raw_bytes = self.raw(token.range).into();
        data.range = token.range;
        self.builder.alloc(data)
    }

    /// Comment written on its own line(s) directly above the current token.
    pub(crate) fn leading_comment(&self) -> Box<str> {
        match self.trivia.leading {
            Some((token, newlines)) if newlines < 2 => self.comment_text(&token),
            _ => Box::default(),
        }
    }

    fn claim_trailing_comment(&mut self) -> Box<str> {
        match self.trivia.trailing {
            Some(token) if !self.trailing_claimed => {
                self.trailing_claimed = true;
                self.comment_text(&token)
            }
            _ => Box::default(),
        }
    }

    /// Gives a comment that follows a separator on the same line to the entry before the
    /// separator, unless that entry already has one.
    pub(crate) fn attach_trailing_comment(&mut self, node: Node) {
        if self.builder.data_mut(node).post_comment.is_empty() {
            let comment = self.claim_trailing_comment();
            self.builder.data_mut(node).post_comment = comment;
        }
    }

    fn comment_text(&self, token: &Token) -> Box<str> {
        String::from_utf8_lossy(comment_body(token, self.file.bytes())).into()
    }

    pub(crate) fn error_at(&mut self, message: impl Into<String>, range: TextRange, node: Node) {
        self.diagnostics.push(Diagnostic::error(message, range).with_node(node));
    }

    pub(crate) fn builder(&mut self) -> &mut TreeBuilder {
        &mut self.builder
    }

    pub(crate) fn data_mut(&mut self, node: Node) -> &mut NodeData {
        self.builder.data_mut(node)
    }

    pub(crate) fn push_child(&mut self, parent: Node, child: Node) {
        self.builder.push_child(parent, child);
    }

    pub(crate) fn start(&mut self) -> Marker {
        self.start_from(self.token.range.start())
    }

    pub(crate) fn start_from(&mut self, start: TextSize) -> Marker {
        let node = self.builder.alloc(NodeData::new(NodeKind::Main, ""));
        Marker::new(node, start)
    }

    /// Turns `token` into the text and literal flags of `node`, reporting problems inside the
    /// literal against the node.
    pub(crate) fn set_label(&mut self, node: Node, token: Token) {
        let raw = self.text(token.range);
        let (literal, string): (LiteralKind, Box<str>) = match token.string_style {
            Some(style) => {
                let body = literal_body(&token, self.file.bytes());
                (LiteralKind::String(style), decode_string(body).into())
            }
            None => {
                let kind = match token.kind {
                    TokenKind::NUMERIC_LITERAL => LiteralKind::Numeric,
                    TokenKind::SYMBOL => LiteralKind::Symbol,
                    _ => LiteralKind::Identifier,
                };
                (kind, raw.into())
            }
        };

        let raw_bytes = self.raw(token.range);
        let data = self.builder.data_mut(node);
        data.string = string;
        data.raw_string = raw.into();
        data.raw_bytes = raw_bytes.into();
        data.flags = NodeFlags { literal: Some(literal), ..data.flags };

        self.report_token_error(&token, Some(node));
        if let Err(err) = std::str::from_utf8(token.text(self.file.bytes())) {
            let start = token.range.start() + TextSize::new(err.valid_up_to() as u32);
            let len = TextSize::new(err.error_len().unwrap_or(1) as u32);
            self.error_at(TokenError::InvalidByte.message(), TextRange::at(start, len), node);
        }
    }

    /// Hands back the built nodes, the diagnostics, and the offset of the first token that was
    /// not consumed.
    pub(crate) fn finish(self) -> (TreeBuilder, Diagnostics, TextSize) {
        let end = if self.at_eof() { self.file.len() } else { self.token.range.start() };
        (self.builder, self.diagnostics, end)
    }
}

pub(crate) struct Marker {
    node: Node,
    start: TextSize,
    bomb: DropBomb,
}

impl Marker {
    fn new(node: Node, start: TextSize) -> Self {
        Self { node, start, bomb: DropBomb::new("Marker must be completed") }
    }

    pub(crate) fn node(&self) -> Node {
        self.node
    }

    /// Fixes the node's range to end at the last consumed token and attaches the comment that
    /// trails it on the same line.
    pub(crate) fn complete(mut self, p: &mut Parser<'_>, kind: NodeKind) -> Node {
        self.bomb.defuse();

        let end = p.prev_end.max(self.start);
        let post_comment = p.claim_trailing_comment();
        let data = p.builder.data_mut(self.node);
        data.kind = kind;
        data.range = TextRange::new(self.start, end);
        data.post_comment = post_comment;
        self.node
    }
}
