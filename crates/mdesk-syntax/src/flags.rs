//! Structural facts recorded on every node at creation time.

use crate::{Quote, StringStyle};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Delimiter {
    Paren,
    Bracket,
    Brace,
}

impl Delimiter {
    pub fn open_byte(self) -> u8 {
        match self {
            Delimiter::Paren => b'(',
            Delimiter::Bracket => b'[',
            Delimiter::Brace => b'{',
        }
    }

    pub fn close_byte(self) -> u8 {
        match self {
            Delimiter::Paren => b')',
            Delimiter::Bracket => b']',
            Delimiter::Brace => b'}',
        }
    }

    pub fn from_open(byte: u8) -> Option<Self> {
        match byte {
            b'(' => Some(Delimiter::Paren),
            b'[' => Some(Delimiter::Bracket),
            b'{' => Some(Delimiter::Brace),
            _ => None,
        }
    }

    pub fn from_close(byte: u8) -> Option<Self> {
        match byte {
            b')' => Some(Delimiter::Paren),
            b']' => Some(Delimiter::Bracket),
            b'}' => Some(Delimiter::Brace),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Separator {
    Comma,
    Semicolon,
}

impl Separator {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b',' => Some(Separator::Comma),
            b';' => Some(Separator::Semicolon),
            _ => None,
        }
    }
}

/// What kind of token a leaf or label node was written as.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LiteralKind {
    Identifier,
    Numeric,
    String(StringStyle),
    Symbol,
}

/// Typed node facets. The left and right delimiters are independent, so `(0, 100]` records a
/// paren on the left and a bracket on the right.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct NodeFlags {
    pub open: Option<Delimiter>,
    pub close: Option<Delimiter>,
    /// Separator written directly after this node.
    pub followed_by: Option<Separator>,
    /// Separator written directly before this node.
    pub preceded_by: Option<Separator>,
    pub literal: Option<LiteralKind>,
}

impl NodeFlags {
    pub fn literal(kind: LiteralKind) -> Self {
        Self { literal: Some(kind), ..Self::default() }
    }

    pub fn contains(&self, flag: NodeFlag) -> bool {
        use NodeFlag::*;

        let string = match self.literal {
            Some(LiteralKind::String(style)) => Some(style),
            _ => None,
        };

        match flag {
            HasParenLeft => self.open == Some(Delimiter::Paren),
            HasParenRight => self.close == Some(Delimiter::Paren),
            HasBracketLeft => self.open == Some(Delimiter::Bracket),
            HasBracketRight => self.close == Some(Delimiter::Bracket),
            HasBraceLeft => self.open == Some(Delimiter::Brace),
            HasBraceRight => self.close == Some(Delimiter::Brace),
            IsBeforeComma => self.followed_by == Some(Separator::Comma),
            IsAfterComma => self.preceded_by == Some(Separator::Comma),
            IsBeforeSemicolon => self.followed_by == Some(Separator::Semicolon),
            IsAfterSemicolon => self.preceded_by == Some(Separator::Semicolon),
            Identifier => self.literal == Some(LiteralKind::Identifier),
            Numeric => self.literal == Some(LiteralKind::Numeric),
            Symbol => self.literal == Some(LiteralKind::Symbol),
            StringLiteral => string.is_some(),
            StringSingleQuote => string.is_some_and(|s| s.quote == Quote::Single),
            StringDoubleQuote => string.is_some_and(|s| s.quote == Quote::Double),
            StringTick => string.is_some_and(|s| s.quote == Quote::Tick),
            StringTriplet => string.is_some_and(|s| s.triplet),
        }
    }

    pub fn to_set(&self) -> FlagSet {
        NodeFlag::ALL
            .iter()
            .filter(|&&flag| self.contains(flag))
            .fold(FlagSet::EMPTY, |set, &flag| set.with(flag))
    }

    pub fn intersects(&self, set: &FlagSet) -> bool {
        self.to_set().intersects(set)
    }
}

/// A single queryable fact about a node, derived on demand from [`NodeFlags`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NodeFlag {
    HasParenLeft,
    HasParenRight,
    HasBracketLeft,
    HasBracketRight,
    HasBraceLeft,
    HasBraceRight,
    IsBeforeComma,
    IsAfterComma,
    IsBeforeSemicolon,
    IsAfterSemicolon,
    Identifier,
    Numeric,
    StringLiteral,
    Symbol,
    StringSingleQuote,
    StringDoubleQuote,
    StringTick,
    StringTriplet,
}

impl NodeFlag {
    pub const ALL: [NodeFlag; 18] = {
        use NodeFlag::*;
        [
            HasParenLeft,
            HasParenRight,
            HasBracketLeft,
            HasBracketRight,
            HasBraceLeft,
            HasBraceRight,
            IsBeforeComma,
            IsAfterComma,
            IsBeforeSemicolon,
            IsAfterSemicolon,
            Identifier,
            Numeric,
            StringLiteral,
            Symbol,
            StringSingleQuote,
            StringDoubleQuote,
            StringTick,
            StringTriplet,
        ]
    };
}

/// Compact set of [`NodeFlag`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagSet {
    bits: u32,
}

impl FlagSet {
    pub const EMPTY: Self = Self { bits: 0 };

    pub const BEFORE_SEPARATOR: Self =
        Self::new([NodeFlag::IsBeforeComma, NodeFlag::IsBeforeSemicolon]);
    pub const AFTER_SEPARATOR: Self =
        Self::new([NodeFlag::IsAfterComma, NodeFlag::IsAfterSemicolon]);

    const fn from_flag(flag: NodeFlag) -> Self {
        Self { bits: 1 << flag as u32 }
    }

    pub const fn new<const N: usize>(flags: [NodeFlag; N]) -> Self {
        let mut set = Self::EMPTY;

        let mut i = 0;
        while i < flags.len() {
            set = set.union(&Self::from_flag(flags[i]));
            i += 1;
        }

        set
    }

    pub const fn union(mut self, other: &Self) -> Self {
        self.bits |= other.bits;
        self
    }

    pub const fn with(self, flag: NodeFlag) -> Self {
        self.union(&Self::from_flag(flag))
    }

    pub const fn contains(&self, flag: NodeFlag) -> bool {
        self.bits & Self::from_flag(flag).bits != 0
    }

    pub const fn intersects(&self, other: &Self) -> bool {
        self.bits & other.bits != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn iter(self) -> impl Iterator<Item = NodeFlag> {
        NodeFlag::ALL.into_iter().filter(move |&flag| self.contains(flag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_delimiters_are_independent() {
        let flags = NodeFlags {
            open: Some(Delimiter::Paren),
            close: Some(Delimiter::Bracket),
            ..NodeFlags::default()
        };

        assert!(flags.contains(NodeFlag::HasParenLeft));
        assert!(flags.contains(NodeFlag::HasBracketRight));
        assert!(!flags.contains(NodeFlag::HasParenRight));
        assert!(!flags.contains(NodeFlag::HasBracketLeft));
    }

    #[test]
    fn string_style_expands_to_flags() {
        let flags =
            NodeFlags::literal(LiteralKind::String(StringStyle::new(Quote::Double, true)));
        let set = flags.to_set();

        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![NodeFlag::StringLiteral, NodeFlag::StringDoubleQuote, NodeFlag::StringTriplet]
        );
    }

    #[test]
    fn flag_set_queries() {
        let set = FlagSet::new([NodeFlag::IsAfterComma, NodeFlag::Numeric]);
        assert!(set.contains(NodeFlag::Numeric));
        assert!(!set.contains(NodeFlag::Identifier));
        assert!(set.intersects(&FlagSet::AFTER_SEPARATOR));
        assert!(!set.intersects(&FlagSet::BEFORE_SEPARATOR));
        assert!(FlagSet::EMPTY.is_empty());
    }
}
