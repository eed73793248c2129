/// The quote character that delimits a string literal.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Quote {
    Single,
    Double,
    Tick,
}

impl Quote {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'\'' => Some(Quote::Single),
            b'"' => Some(Quote::Double),
            b'`' => Some(Quote::Tick),
            _ => None,
        }
    }

    pub fn byte(self) -> u8 {
        match self {
            Quote::Single => b'\'',
            Quote::Double => b'"',
            Quote::Tick => b'`',
        }
    }
}

/// How a string literal was written: which quote, and whether it was tripled.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct StringStyle {
    pub quote: Quote,
    pub triplet: bool,
}

impl StringStyle {
    pub fn new(quote: Quote, triplet: bool) -> Self {
        Self { quote, triplet }
    }

    /// Number of delimiter bytes on each side of the literal body.
    pub fn delimiter_len(self) -> usize {
        if self.triplet { 3 } else { 1 }
    }
}
