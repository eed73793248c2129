use text_size::TextSize;

pub(crate) const EOF_BYTE: u8 = b'\0';

pub(crate) struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    start: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(bytes: &'a [u8], pos: usize) -> Self {
        let pos = pos.min(bytes.len());
        Self { bytes, pos, start: pos }
    }

    pub(crate) fn start(&self) -> TextSize {
        TextSize::new(self.start as u32)
    }

    pub(crate) fn pos(&self) -> TextSize {
        TextSize::new(self.pos as u32)
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub(crate) fn rest(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    pub(crate) fn previous(&self) -> u8 {
        if self.pos > self.start { self.bytes[self.pos - 1] } else { EOF_BYTE }
    }

    pub(crate) fn nth(&self, n: usize) -> u8 {
        self.bytes.get(self.pos + n).copied().unwrap_or(EOF_BYTE)
    }

    pub(crate) fn first(&self) -> u8 {
        self.nth(0)
    }

    pub(crate) fn second(&self) -> u8 {
        self.nth(1)
    }

    pub(crate) fn third(&self) -> u8 {
        self.nth(2)
    }

    pub(crate) fn starts_with(&self, prefix: &[u8]) -> bool {
        self.rest().starts_with(prefix)
    }

    pub(crate) fn advance(&mut self) -> u8 {
        let byte = self.first();
        self.advance_by(1);
        byte
    }

    pub(crate) fn advance_by(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.bytes.len());
    }

    pub(crate) fn advance_while(&mut self, f: impl Fn(u8) -> bool + Copy) {
        while !self.is_eof() && f(self.first()) {
            self.advance();
        }
    }

    pub(crate) fn advance_to_end(&mut self) {
        self.pos = self.bytes.len();
    }
}
