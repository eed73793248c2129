#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TokenKind {
    IDENTIFIER,
    NUMERIC_LITERAL,
    STRING_LITERAL,
    SYMBOL,

    WHITESPACE,
    COMMENT,
    BAD_CHARACTER,

    EOF,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::WHITESPACE | TokenKind::COMMENT | TokenKind::BAD_CHARACTER)
    }
}
