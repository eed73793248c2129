use crate::{Token, TokenError, TokenKind};

/// The bytes between a string literal's delimiters. The closing delimiter is only stripped when
/// the literal was terminated; other tokens are returned whole.
pub fn literal_body<'a>(token: &Token, source: &'a [u8]) -> &'a [u8] {
    let text = token.text(source);
    let Some(style) = token.string_style else { return text };

    let open = style.delimiter_len().min(text.len());
    let close = match token.error {
        Some(TokenError::UnterminatedString) => 0,
        _ => style.delimiter_len(),
    };
    &text[open..text.len().saturating_sub(close).max(open)]
}

/// Resolves `\n`, `\t`, `\r`, `\0` and `\\`. Any other escape is kept as written. Invalid UTF-8
/// is decoded lossily.
pub fn decode_string(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if !text.contains('\\') {
        return text.into_owned();
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Comment text without its `//` or `/* */` markers.
pub fn comment_body<'a>(token: &Token, source: &'a [u8]) -> &'a [u8] {
    debug_assert_eq!(token.kind, TokenKind::COMMENT);

    let text = token.text(source);
    if text.starts_with(b"//") {
        return &text[2..];
    }
    match token.error {
        Some(TokenError::UnterminatedComment) => &text[2.min(text.len())..],
        _ if text.len() >= 4 => &text[2..text.len() - 2],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use text_size::TextSize;

    use super::*;
    use crate::token_at;

    fn body(source: &str) -> String {
        let token = token_at(source.as_bytes(), TextSize::new(0));
        decode_string(literal_body(&token, source.as_bytes()))
    }

    #[test]
    fn delimiters_are_stripped() {
        let inputs = [
            "'foo-bar'",
            "'''foo-bar'''",
            "\"foo-bar\"",
            "\"\"\"foo-bar\"\"\"",
            "`foo-bar`",
            "```foo-bar```",
        ];

        for input in inputs {
            assert_eq!(body(input), "foo-bar", "Input: {input}");
        }
    }

    #[test]
    fn escapes() {
        let inputs = [
            ("`\\``", "\\`"),
            ("''' \\''' '''", " \\''' "),
            ("'a\\nb'", "a\nb"),
            ("'a\\tb\\rc'", "a\tb\rc"),
            ("'a\\\\b'", "a\\b"),
            ("'\\0'", "\0"),
            ("'\\q'", "\\q"),
        ];

        for (input, expected) in inputs {
            assert_eq!(body(input), expected, "Input: {input}");
        }
    }

    #[test]
    fn unterminated_keeps_the_tail() {
        assert_eq!(body("'''\nmulti-line"), "\nmulti-line");
        assert_eq!(body("'"), "");
    }

    #[test]
    fn invalid_bytes_are_replaced() {
        assert_eq!(decode_string(b"a\xffb"), "a\u{fffd}b");
    }

    #[test]
    fn comment_markers_are_stripped() {
        let inputs =
            [("// foobar", " foobar"), ("/*foobar*/", "foobar"), ("/**/", ""), ("/* foo", " foo")];

        for (input, expected) in inputs {
            let token = token_at(input.as_bytes(), TextSize::new(0));
            let body = comment_body(&token, input.as_bytes());
            assert_eq!(body, expected.as_bytes(), "Input: {input}");
        }
    }
}
