mod cursor;
mod literal;

use cursor::Cursor;
pub use literal::{comment_body, decode_string, literal_body};
use mdesk_syntax::TokenKind::*;
pub use mdesk_syntax::{Quote, StringStyle, TokenKind};
use text_size::{TextRange, TextSize};

/// Lexical problems are carried on the token; the parser turns them into diagnostics.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TokenError {
    UnterminatedString,
    UnterminatedComment,
    InvalidByte,
    ControlCharacter,
}

impl TokenError {
    pub fn message(self) -> &'static str {
        match self {
            TokenError::UnterminatedString => "unterminated string literal",
            TokenError::UnterminatedComment => "unterminated block comment",
            TokenError::InvalidByte => "invalid UTF-8 byte sequence",
            TokenError::ControlCharacter => "unexpected control character",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub range: TextRange,
    pub string_style: Option<StringStyle>,
    pub error: Option<TokenError>,
}

impl Token {
    pub fn text<'a>(&self, source: &'a [u8]) -> &'a [u8] {
        let range: std::ops::Range<usize> = self.range.into();
        &source[range]
    }

    pub fn end(&self) -> TextSize {
        self.range.end()
    }

    /// Single-byte symbol value, if this is a symbol token.
    pub fn symbol(&self, source: &[u8]) -> Option<u8> {
        match (self.kind, self.text(source)) {
            (SYMBOL, &[byte]) => Some(byte),
            _ => None,
        }
    }
}

/// Lexes the single token starting at `offset`. At or past the end of input this returns an
/// empty `EOF` token.
pub fn token_at(text: &[u8], offset: TextSize) -> Token {
    let mut cursor = Cursor::new(text, usize::from(offset));
    let mut string_style = None;
    let mut error = None;

    let kind = if cursor.is_eof() {
        EOF
    } else {
        match cursor.first() {
            b' ' | b'\t' | b'\n' | b'\r' | b'\x0b' | b'\x0c' => {
                cursor.advance_while(is_whitespace);
                WHITESPACE
            }
            b'/' if cursor.second() == b'/' => {
                cursor.advance_while(|byte| byte != b'\n');
                COMMENT
            }
            b'/' if cursor.second() == b'*' => {
                if !block_comment(&mut cursor) {
                    error = Some(TokenError::UnterminatedComment);
                }
                COMMENT
            }
            quote @ (b'\'' | b'"' | b'`') => {
                let (style, terminated) = string(&mut cursor, quote);
                string_style = Some(style);
                if !terminated {
                    error = Some(TokenError::UnterminatedString);
                }
                STRING_LITERAL
            }
            b'0'..=b'9' => {
                number(&mut cursor);
                NUMERIC_LITERAL
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                identifier(&mut cursor);
                IDENTIFIER
            }
            byte if byte.is_ascii_punctuation() => {
                cursor.advance();
                SYMBOL
            }
            byte if byte.is_ascii() => {
                cursor.advance();
                error = Some(TokenError::ControlCharacter);
                BAD_CHARACTER
            }
            _ => match utf8_char(cursor.rest()) {
                Ok(ch) if ch.is_alphanumeric() => {
                    identifier(&mut cursor);
                    IDENTIFIER
                }
                Ok(ch) => {
                    cursor.advance_by(ch.len_utf8());
                    SYMBOL
                }
                Err(len) => {
                    cursor.advance_by(len);
                    error = Some(TokenError::InvalidByte);
                    BAD_CHARACTER
                }
            },
        }
    };

    Token { kind, range: TextRange::new(cursor.start(), cursor.pos()), string_style, error }
}

/// Lazy, restartable token stream over a byte string. Iteration stops before `EOF`.
#[derive(Clone, Debug)]
pub struct Tokenizer<'a> {
    text: &'a [u8],
    offset: TextSize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a [u8]) -> Self {
        Self::at(text, TextSize::new(0))
    }

    pub fn at(text: &'a [u8], offset: TextSize) -> Self {
        Self { text, offset }
    }

    pub fn text(&self) -> &'a [u8] {
        self.text
    }

    pub fn offset(&self) -> TextSize {
        self.offset
    }

    pub fn peek(&self) -> Token {
        token_at(self.text, self.offset)
    }

    /// Returns the next token, or `EOF` forever once the input is exhausted.
    pub fn next_token(&mut self) -> Token {
        let token = self.peek();
        self.offset = token.end();
        token
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        (token.kind != EOF).then_some(token)
    }
}

fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | b'\x0b' | b'\x0c')
}

/// The first scalar of `bytes`, or the length of the invalid sequence that starts it.
fn utf8_char(bytes: &[u8]) -> Result<char, usize> {
    let window = &bytes[..bytes.len().min(4)];
    match window.utf8_chunks().next() {
        Some(chunk) => match chunk.valid().chars().next() {
            Some(ch) => Ok(ch),
            None => Err(chunk.invalid().len().max(1)),
        },
        None => Err(1),
    }
}

fn identifier(cursor: &mut Cursor<'_>) {
    loop {
        match cursor.first() {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' => {
                cursor.advance();
            }
            byte if !byte.is_ascii() => match utf8_char(cursor.rest()) {
                Ok(ch) if ch.is_alphanumeric() => cursor.advance_by(ch.len_utf8()),
                _ => return,
            },
            _ => return,
        }
    }
}

/// Consumes everything that belongs to a literal starting with a digit. Well-formedness is
/// left to consumers, so `123abc` is still one numeric token.
fn number(cursor: &mut Cursor<'_>) {
    let hex = cursor.first() == b'0' && matches!(cursor.second(), b'x' | b'X');
    let mut seen_dot = false;
    cursor.advance();

    loop {
        match cursor.first() {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' => {
                cursor.advance();
            }
            b'.' if !hex && !seen_dot && cursor.second().is_ascii_digit() => {
                seen_dot = true;
                cursor.advance();
            }
            b'+' | b'-'
                if !hex
                    && matches!(cursor.previous(), b'e' | b'E')
                    && cursor.second().is_ascii_digit() =>
            {
                cursor.advance();
            }
            _ => return,
        }
    }
}

/// Returns whether the literal was closed before the end of input.
fn string(cursor: &mut Cursor<'_>, quote: u8) -> (StringStyle, bool) {
    let triplet = cursor.second() == quote && cursor.third() == quote;
    let style = StringStyle::new(Quote::from_byte(quote).unwrap_or(Quote::Double), triplet);
    let closing = [quote; 3];
    let closing = &closing[..style.delimiter_len()];

    cursor.advance_by(style.delimiter_len());
    while !cursor.is_eof() {
        if cursor.first() == b'\\' {
            cursor.advance_by(2);
            continue;
        }
        if cursor.starts_with(closing) {
            cursor.advance_by(closing.len());
            return (style, true);
        }
        cursor.advance();
    }

    (style, false)
}

/// Block comments do not nest: the first `*/` closes.
fn block_comment(cursor: &mut Cursor<'_>) -> bool {
    cursor.advance_by(2);
    while !cursor.is_eof() {
        if cursor.starts_with(b"*/") {
            cursor.advance_by(2);
            return true;
        }
        cursor.advance();
    }
    cursor.advance_to_end();
    false
}
