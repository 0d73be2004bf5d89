//! CSS tokenizer implementation.

use super::token::{DimensionUnit, Location, Token, TokenTag};

/// [§ 4.3 Tokenizer Algorithms](https://www.w3.org/TR/css-syntax-3/#tokenizer-algorithms)
///
/// CSS tokenizer following the CSS Syntax Module Level 3 specification.
///
/// The tokenizer is a cursor over the source text: each call to
/// [`Tokenizer::next_token`] consumes one token and returns its tag and
/// starting byte offset. Nothing textual is copied out; identifier and url
/// text is decoded on demand from a token's location (see
/// [`IdentSequenceIter`], [`decode_string`], [`decode_url`]).
pub struct Tokenizer<'a> {
    /// The source text being tokenized.
    source: &'a str,
    /// Current byte position in the source.
    position: usize,
    /// Byte position before the last `consume`, for `reconsume`.
    prev_position: usize,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer at the start of the source.
    #[must_use]
    pub const fn new(source: &'a str) -> Self {
        Self {
            source,
            position: 0,
            prev_position: 0,
        }
    }

    /// Create a tokenizer positioned at a previously returned token location.
    ///
    /// Re-reading a token from its location always yields the same token;
    /// consumers use this to recover token extents and payload text.
    #[must_use]
    pub const fn at(source: &'a str, location: Location) -> Self {
        Self {
            source,
            position: location as usize,
            prev_position: location as usize,
        }
    }

    /// Current byte position (one past the last consumed token).
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// [§ 4.3.1 Consume a token](https://www.w3.org/TR/css-syntax-3/#consume-token)
    ///
    /// "This section describes how to consume a token from a stream of code
    /// points. It will return a single token of any type."
    #[allow(clippy::cast_possible_truncation)]
    pub fn next_token(&mut self) -> Token {
        let location = self.position as Location;
        let tag = self.consume_token_tag();
        Token { tag, location }
    }

    /// [§ 4.3.1 Consume a token](https://www.w3.org/TR/css-syntax-3/#consume-token)
    fn consume_token_tag(&mut self) -> TokenTag {
        // "Consume comments." — kept as a token of their own so that source
        // positions survive into the component tree.
        if self.peek() == Some('/') && self.peek_at(1) == Some('*') {
            return self.consume_comment();
        }

        // "Consume the next input code point."
        let Some(c) = self.consume() else {
            return TokenTag::Eof;
        };

        match c {
            // "whitespace"
            // "Consume as much whitespace as possible. Return a <whitespace-token>."
            c if is_whitespace(c) => {
                self.consume_whitespace();
                TokenTag::Whitespace
            }

            // "U+0022 QUOTATION MARK (")"
            // "Consume a string token and return it."
            '"' => self.consume_string_token('"'),

            // "U+0023 NUMBER SIGN (#)"
            '#' => {
                // "If the next input code point is an ident code point or the
                // next two input code points are a valid escape..."
                if self.peek().is_some_and(is_ident_code_point)
                    || self.is_valid_escape(self.peek(), self.peek_at(1))
                {
                    // "If the next 3 input code points would start an ident
                    // sequence, set the <hash-token>'s type flag to 'id'."
                    let tag = if self.would_start_ident_sequence() {
                        TokenTag::HashId
                    } else {
                        TokenTag::HashUnrestricted
                    };
                    // "Consume an ident sequence, and set the <hash-token>'s
                    // value to the returned string."
                    self.consume_ident_sequence();
                    tag
                } else {
                    // "Otherwise, return a <delim-token> with its value set to
                    // the current input code point."
                    TokenTag::Delim('#')
                }
            }

            // "U+0027 APOSTROPHE (')"
            '\'' => self.consume_string_token('\''),

            // "U+0028 LEFT PARENTHESIS (()"
            '(' => TokenTag::LeftParen,

            // "U+0029 RIGHT PARENTHESIS ())"
            ')' => TokenTag::RightParen,

            // "U+002B PLUS SIGN (+)"
            '+' => {
                // "If the input stream starts with a number..."
                if self.would_start_number() {
                    self.reconsume();
                    self.consume_numeric_token()
                } else {
                    TokenTag::Delim('+')
                }
            }

            // "U+002C COMMA (,)"
            ',' => TokenTag::Comma,

            // "U+002D HYPHEN-MINUS (-)"
            '-' => {
                // "If the input stream starts with a number..."
                if self.would_start_number() {
                    self.reconsume();
                    self.consume_numeric_token()
                }
                // "Otherwise, if the next 2 input code points are
                // U+002D U+003E (->)..."
                else if self.peek() == Some('-') && self.peek_at(1) == Some('>') {
                    let _ = self.consume(); // -
                    let _ = self.consume(); // >
                    TokenTag::Cdc
                }
                // "Otherwise, if the input stream starts with an ident sequence..."
                else if self.would_start_ident_sequence_with(Some('-')) {
                    self.reconsume();
                    self.consume_ident_like_token()
                } else {
                    TokenTag::Delim('-')
                }
            }

            // "U+002E FULL STOP (.)"
            '.' => {
                if self.would_start_number() {
                    self.reconsume();
                    self.consume_numeric_token()
                } else {
                    TokenTag::Delim('.')
                }
            }

            // "U+003A COLON (:)"
            ':' => TokenTag::Colon,

            // "U+003B SEMICOLON (;)"
            ';' => TokenTag::Semicolon,

            // "U+003C LESS-THAN SIGN (<)"
            '<' => {
                // "If the next 3 input code points are U+0021 U+002D U+002D (!--)..."
                if self.peek() == Some('!')
                    && self.peek_at(1) == Some('-')
                    && self.peek_at(2) == Some('-')
                {
                    let _ = self.consume(); // !
                    let _ = self.consume(); // -
                    let _ = self.consume(); // -
                    TokenTag::Cdo
                } else {
                    TokenTag::Delim('<')
                }
            }

            // "U+0040 COMMERCIAL AT (@)"
            '@' => {
                // "If the next 3 input code points would start an ident sequence..."
                if self.would_start_ident_sequence() {
                    self.consume_ident_sequence();
                    TokenTag::AtKeyword
                } else {
                    TokenTag::Delim('@')
                }
            }

            // "U+005B LEFT SQUARE BRACKET ([)"
            '[' => TokenTag::LeftBracket,

            // "U+005C REVERSE SOLIDUS (\)"
            '\\' => {
                // "If the input stream starts with a valid escape..."
                if self.is_valid_escape(Some('\\'), self.peek()) {
                    self.reconsume();
                    self.consume_ident_like_token()
                } else {
                    // "This is a parse error."
                    TokenTag::Delim('\\')
                }
            }

            // "U+005D RIGHT SQUARE BRACKET (])"
            ']' => TokenTag::RightBracket,

            // "U+007B LEFT CURLY BRACKET ({)"
            '{' => TokenTag::LeftCurly,

            // "U+007D RIGHT CURLY BRACKET (})"
            '}' => TokenTag::RightCurly,

            // "digit"
            c if c.is_ascii_digit() => {
                self.reconsume();
                self.consume_numeric_token()
            }

            // "ident-start code point"
            c if is_ident_start_code_point(c) => {
                self.reconsume();
                self.consume_ident_like_token()
            }

            // "anything else"
            // "Return a <delim-token> with its value set to the current input
            // code point."
            c => TokenTag::Delim(c),
        }
    }

    /// [§ 4.3.2 Consume comments](https://www.w3.org/TR/css-syntax-3/#consume-comment)
    ///
    /// "If the next two input code points are U+002F SOLIDUS (/) followed by
    /// U+002A ASTERISK (*), consume them and all following code points up to
    /// and including the first U+002A ASTERISK (*) followed by U+002F SOLIDUS
    /// (/), or up to an EOF code point."
    fn consume_comment(&mut self) -> TokenTag {
        let _ = self.consume(); // /
        let _ = self.consume(); // *

        loop {
            match self.consume() {
                Some('*') if self.peek() == Some('/') => {
                    let _ = self.consume(); // /
                    return TokenTag::Comment;
                }
                Some(_) => {}
                None => return TokenTag::Comment, // EOF
            }
        }
    }

    /// Consume whitespace characters.
    fn consume_whitespace(&mut self) {
        while self.peek().is_some_and(is_whitespace) {
            let _ = self.consume();
        }
    }

    /// [§ 4.3.4 Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    fn consume_string_token(&mut self, ending_code_point: char) -> TokenTag {
        loop {
            match self.consume() {
                // "ending code point" — "Return the <string-token>."
                Some(c) if c == ending_code_point => return TokenTag::String,

                // "EOF" — "This is a parse error. Return the <string-token>."
                None => return TokenTag::String,

                // "newline" — "This is a parse error. Reconsume the current
                // input code point, create a <bad-string-token>, and return it."
                Some('\n') => {
                    self.reconsume();
                    return TokenTag::BadString;
                }

                // "U+005C REVERSE SOLIDUS (\)"
                Some('\\') => match self.peek() {
                    // "If the next input code point is EOF, do nothing."
                    None => {}
                    // "Otherwise, if the next input code point is a newline,
                    // consume it."
                    Some('\n') => {
                        let _ = self.consume();
                    }
                    // "Otherwise, (the stream starts with a valid escape)
                    // consume an escaped code point."
                    Some(_) => {
                        let _ = self.consume_escaped_code_point();
                    }
                },

                // "anything else" — part of the string's value.
                Some(_) => {}
            }
        }
    }

    /// [§ 4.3.3 Consume a numeric token](https://www.w3.org/TR/css-syntax-3/#consume-numeric-token)
    fn consume_numeric_token(&mut self) -> TokenTag {
        // "Consume a number and let number be the result."
        let (repr, is_integer) = self.consume_number();

        // "If the next 3 input code points would start an ident sequence..."
        if self.would_start_ident_sequence() {
            // "Create a <dimension-token>... Consume an ident sequence. Set
            // the <dimension-token>'s unit to the returned value."
            let unit_start = self.position;
            self.consume_ident_sequence();
            let unit = if ident_eq_ignore_case(self.source, unit_start as Location, "px") {
                DimensionUnit::Px
            } else {
                DimensionUnit::Unrecognized
            };
            TokenTag::Dimension {
                number: repr.parse().unwrap_or(0.0),
                unit,
            }
        }
        // "Otherwise, if the next input code point is U+0025 PERCENTAGE SIGN (%)..."
        else if self.peek() == Some('%') {
            let _ = self.consume();
            TokenTag::Percentage(repr.parse().unwrap_or(0.0))
        }
        // "Otherwise, create a <number-token> with the same value and type
        // flag as number, and return it."
        else if is_integer {
            // Out-of-range integers collapse to 0 rather than saturating;
            // callers treat the declared value as integer zero.
            TokenTag::Integer(repr.parse().unwrap_or(0))
        } else {
            TokenTag::Number(repr.parse().unwrap_or(0.0))
        }
    }

    /// [§ 4.3.4 Consume an ident-like token](https://www.w3.org/TR/css-syntax-3/#consume-ident-like-token)
    fn consume_ident_like_token(&mut self) -> TokenTag {
        // "Consume an ident sequence, and let string be the result."
        let name_start = self.position;
        self.consume_ident_sequence();

        // "If string's value is an ASCII case-insensitive match for 'url',
        // and the next input code point is U+0028 LEFT PARENTHESIS (()"
        if ident_eq_ignore_case(self.source, name_start as Location, "url")
            && self.peek() == Some('(')
        {
            let _ = self.consume(); // (

            // "While the next two input code points are whitespace, consume
            // the next input code point."
            self.consume_whitespace();

            // "If the next one or two input code points are U+0022 QUOTATION
            // MARK, U+0027 APOSTROPHE, or whitespace followed by either..."
            match self.peek() {
                Some('"' | '\'') => TokenTag::Function,
                // "Otherwise, consume a url token, and return it."
                _ => self.consume_url_token(),
            }
        }
        // "Otherwise, if the next input code point is U+0028 LEFT PARENTHESIS (()"
        else if self.peek() == Some('(') {
            let _ = self.consume();
            TokenTag::Function
        }
        // "Otherwise, return an <ident-token> with its value set to string."
        else {
            TokenTag::Ident
        }
    }

    /// [§ 4.3.6 Consume a url token](https://www.w3.org/TR/css-syntax-3/#consume-url-token)
    fn consume_url_token(&mut self) -> TokenTag {
        // "Consume as much whitespace as possible."
        self.consume_whitespace();

        loop {
            match self.consume() {
                // "U+0029 RIGHT PARENTHESIS ())" — "Return the <url-token>."
                Some(')') => return TokenTag::Url,

                // "EOF" — "This is a parse error. Return the <url-token>."
                None => return TokenTag::Url,

                // "whitespace"
                Some(c) if is_whitespace(c) => {
                    self.consume_whitespace();
                    match self.peek() {
                        Some(')') => {
                            let _ = self.consume();
                            return TokenTag::Url;
                        }
                        None => return TokenTag::Url,
                        _ => {
                            self.consume_bad_url_remnants();
                            return TokenTag::BadUrl;
                        }
                    }
                }

                // "U+0022 QUOTATION MARK ("), U+0027 APOSTROPHE ('),
                // U+0028 LEFT PARENTHESIS (()"
                // "This is a parse error. Consume the remnants of a bad url."
                Some('"' | '\'' | '(') => {
                    self.consume_bad_url_remnants();
                    return TokenTag::BadUrl;
                }

                // "U+005C REVERSE SOLIDUS (\)"
                Some('\\') => {
                    if self.is_valid_escape(Some('\\'), self.peek()) {
                        let _ = self.consume_escaped_code_point();
                    } else {
                        self.consume_bad_url_remnants();
                        return TokenTag::BadUrl;
                    }
                }

                // "anything else" — part of the url's value.
                Some(_) => {}
            }
        }
    }

    /// [§ 4.3.14 Consume the remnants of a bad url](https://www.w3.org/TR/css-syntax-3/#consume-remnants-of-bad-url)
    fn consume_bad_url_remnants(&mut self) {
        loop {
            match self.consume() {
                Some(')') | None => return,
                Some('\\') => {
                    if self.is_valid_escape(Some('\\'), self.peek()) {
                        let _ = self.consume_escaped_code_point();
                    }
                }
                _ => {}
            }
        }
    }

    /// [§ 4.3.11 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    ///
    /// Advances past the sequence without materializing it; the text is
    /// recoverable from the start location via [`IdentSequenceIter`].
    fn consume_ident_sequence(&mut self) {
        loop {
            match self.consume() {
                // "ident code point" — part of the result.
                Some(c) if is_ident_code_point(c) => {}

                // "the stream starts with a valid escape"
                Some('\\') if self.is_valid_escape(Some('\\'), self.peek()) => {
                    let _ = self.consume_escaped_code_point();
                }

                // "anything else" — "Reconsume the current input code point.
                // Return result."
                Some(_) => {
                    self.reconsume();
                    return;
                }

                None => return,
            }
        }
    }

    /// [§ 4.3.12 Consume a number](https://www.w3.org/TR/css-syntax-3/#consume-number)
    ///
    /// Returns the number's repr and whether the type flag is "integer".
    fn consume_number(&mut self) -> (String, bool) {
        // "Initially set type to 'integer'. Let repr be the empty string."
        let mut is_integer = true;
        let mut repr = String::new();

        // "If the next input code point is U+002B PLUS SIGN (+) or
        // U+002D HYPHEN-MINUS (-), consume it and append it to repr."
        if matches!(self.peek(), Some('+' | '-')) {
            repr.push(self.consume().unwrap_or('+'));
        }

        // "While the next input code point is a digit, consume it and append
        // it to repr."
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            repr.push(self.consume().unwrap_or('0'));
        }

        // "If the next 2 input code points are U+002E FULL STOP (.) followed
        // by a digit..."
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            // "Consume them. Append them to repr. Set type to 'number'."
            repr.push(self.consume().unwrap_or('.'));
            repr.push(self.consume().unwrap_or('0'));
            is_integer = false;

            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                repr.push(self.consume().unwrap_or('0'));
            }
        }

        // "If the next 2 or 3 input code points are U+0045 (E) or U+0065 (e),
        // optionally followed by U+002D (-) or U+002B (+), followed by a digit..."
        if matches!(self.peek(), Some('e' | 'E')) {
            let next = self.peek_at(1);
            let has_sign = matches!(next, Some('+' | '-'));
            let digit_pos = if has_sign { 2 } else { 1 };

            if self.peek_at(digit_pos).is_some_and(|c| c.is_ascii_digit()) {
                repr.push(self.consume().unwrap_or('e'));
                if has_sign {
                    repr.push(self.consume().unwrap_or('+'));
                }
                repr.push(self.consume().unwrap_or('0'));
                is_integer = false;

                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    repr.push(self.consume().unwrap_or('0'));
                }
            }
        }

        (repr, is_integer)
    }

    /// [§ 4.3.7 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    fn consume_escaped_code_point(&mut self) -> Option<char> {
        match self.consume() {
            // "hex digit"
            Some(c) if c.is_ascii_hexdigit() => {
                let mut hex = c.to_string();
                // "Consume as many hex digits as possible, but no more than 5."
                for _ in 0..5 {
                    if self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                        hex.push(self.consume().unwrap_or('0'));
                    } else {
                        break;
                    }
                }
                // "If the next input code point is whitespace, consume it."
                if self.peek().is_some_and(is_whitespace) {
                    let _ = self.consume();
                }
                // "Interpret the hex digits as a hexadecimal number."
                let code_point = u32::from_str_radix(&hex, 16).unwrap_or(0xFFFD);
                // "If this number is zero, or is for a surrogate, or is
                // greater than the maximum allowed code point, return U+FFFD
                // REPLACEMENT CHARACTER."
                if code_point == 0
                    || (0xD800..=0xDFFF).contains(&code_point)
                    || code_point > 0x0010_FFFF
                {
                    Some('\u{FFFD}')
                } else {
                    char::from_u32(code_point)
                }
            }
            // "EOF" — "This is a parse error. Return U+FFFD."
            None => Some('\u{FFFD}'),
            // "anything else" — "Return the current input code point."
            Some(c) => Some(c),
        }
    }

    /// [§ 4.3.8 Check if two code points are a valid escape](https://www.w3.org/TR/css-syntax-3/#starts-with-a-valid-escape)
    #[allow(clippy::unused_self)]
    fn is_valid_escape(&self, first: Option<char>, second: Option<char>) -> bool {
        // "If the first code point is not U+005C REVERSE SOLIDUS, return false."
        // "Otherwise, if the second code point is a newline, return false."
        first == Some('\\') && second != Some('\n')
    }

    /// [§ 4.3.9 Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#would-start-an-identifier)
    fn would_start_ident_sequence(&self) -> bool {
        self.would_start_ident_sequence_with(self.peek())
    }

    fn would_start_ident_sequence_with(&self, first: Option<char>) -> bool {
        match first {
            // "U+002D HYPHEN-MINUS"
            Some('-') => {
                let second = self.peek_at(1);
                // "If the second code point is an ident-start code point or a
                // U+002D HYPHEN-MINUS, or the second and third code points are
                // a valid escape, return true."
                second.is_some_and(is_ident_start_code_point)
                    || second == Some('-')
                    || self.is_valid_escape(second, self.peek_at(2))
            }
            // "ident-start code point"
            Some(c) if is_ident_start_code_point(c) => true,
            // "U+005C REVERSE SOLIDUS (\)"
            Some('\\') => self.is_valid_escape(Some('\\'), self.peek_at(1)),
            // "anything else"
            _ => false,
        }
    }

    /// [§ 4.3.10 Check if three code points would start a number](https://www.w3.org/TR/css-syntax-3/#starts-with-a-number)
    fn would_start_number(&self) -> bool {
        match self.peek() {
            // "U+002B PLUS SIGN (+)" or "U+002D HYPHEN-MINUS (-)"
            Some('+' | '-') => {
                let second = self.peek_at(1);
                // "If the second code point is a digit, return true."
                if second.is_some_and(|c| c.is_ascii_digit()) {
                    return true;
                }
                // "Otherwise, if the second code point is U+002E FULL STOP (.)
                // and the third code point is a digit, return true."
                if second == Some('.') {
                    return self.peek_at(2).is_some_and(|c| c.is_ascii_digit());
                }
                false
            }
            // "U+002E FULL STOP (.)"
            Some('.') => self.peek_at(1).is_some_and(|c| c.is_ascii_digit()),
            // "digit"
            Some(c) if c.is_ascii_digit() => true,
            // "anything else"
            _ => false,
        }
    }

    /// Consume and return the next code point.
    fn consume(&mut self) -> Option<char> {
        self.prev_position = self.position;
        let c = self.source[self.position..].chars().next()?;
        self.position += c.len_utf8();
        Some(c)
    }

    /// Put back the last consumed code point.
    const fn reconsume(&mut self) {
        self.position = self.prev_position;
    }

    /// Peek at the next code point without consuming it.
    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    /// Peek at a code point at an offset from the current position.
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.source[self.position..].chars().nth(offset)
    }
}

/// [§ 4.2 Definitions - whitespace](https://www.w3.org/TR/css-syntax-3/#whitespace)
///
/// "A newline, U+0009 CHARACTER TABULATION, or U+0020 SPACE."
fn is_whitespace(c: char) -> bool {
    matches!(c, '\n' | '\t' | ' ' | '\r' | '\x0C')
}

/// [§ 4.2 Definitions - ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
///
/// "A letter, a non-ASCII code point, or U+005F LOW LINE (_)."
fn is_ident_start_code_point(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// [§ 4.2 Definitions - ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
///
/// "An ident-start code point, a digit, or U+002D HYPHEN-MINUS (-)."
fn is_ident_code_point(c: char) -> bool {
    is_ident_start_code_point(c) || c.is_ascii_digit() || c == '-'
}

/// An iterator over the decoded code points of an ident sequence.
///
/// [§ 4.3.11 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
///
/// Starts at a byte offset (an ident-token location, or one past a `#`/`@`
/// for hash and at-keyword tokens) and yields code points with escapes
/// decoded, stopping at the first code point that is not part of the
/// sequence. This is how identifier text is read without ever materializing
/// a string.
pub struct IdentSequenceIter<'a> {
    source: &'a str,
    position: usize,
}

impl<'a> IdentSequenceIter<'a> {
    /// Start an ident iterator at a byte offset into the source.
    #[must_use]
    pub const fn at(source: &'a str, location: Location) -> Self {
        Self {
            source,
            position: location as usize,
        }
    }

    /// Current byte position (one past the last yielded code point).
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.source[self.position..].chars().nth(offset)
    }
}

impl Iterator for IdentSequenceIter<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        let c = self.peek_char(0)?;
        if is_ident_code_point(c) {
            self.position += c.len_utf8();
            return Some(c);
        }
        if c == '\\' && self.peek_char(1) != Some('\n') && self.peek_char(1).is_some() {
            // Decode the escape in place with a throwaway tokenizer cursor.
            #[allow(clippy::cast_possible_truncation)]
            let mut cursor = Tokenizer::at(self.source, self.position as Location + 1);
            let decoded = cursor.consume_escaped_code_point();
            self.position = cursor.position();
            return decoded;
        }
        None
    }
}

/// Compare the ident sequence at `location` against a lowercase needle,
/// ASCII case-insensitively.
///
/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#ident-token-diagram)
///
/// The needle must already be lowercase. The whole sequence must match; a
/// prefix match returns false.
#[must_use]
pub fn ident_eq_ignore_case(source: &str, location: Location, needle: &str) -> bool {
    let mut iter = IdentSequenceIter::at(source, location);
    for expected in needle.chars() {
        match iter.next() {
            Some(c) if c.to_ascii_lowercase() == expected => {}
            _ => return false,
        }
    }
    iter.next().is_none()
}

/// Materialize the ident sequence at `location` into a `String`.
///
/// Only called when a consumer actually needs a copy (attribute names,
/// namespace prefixes); comparisons go through [`ident_eq_ignore_case`].
#[must_use]
pub fn copy_ident(source: &str, location: Location) -> String {
    IdentSequenceIter::at(source, location).collect()
}

/// Decode the value of a string token at `location` (pointing at the opening
/// quote), with escapes resolved.
///
/// [§ 4.3.5 Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
#[must_use]
pub fn decode_string(source: &str, location: Location) -> String {
    let mut cursor = Tokenizer::at(source, location);
    let Some(quote) = cursor.consume() else {
        return String::new();
    };
    let mut value = String::new();
    loop {
        match cursor.consume() {
            None => return value,
            Some(c) if c == quote => return value,
            Some('\n') => return value,
            Some('\\') => match cursor.peek() {
                None => {}
                Some('\n') => {
                    let _ = cursor.consume();
                }
                Some(_) => {
                    if let Some(c) = cursor.consume_escaped_code_point() {
                        value.push(c);
                    }
                }
            },
            Some(c) => value.push(c),
        }
    }
}

/// Decode the value of a url token at `location` (pointing at the `u` of
/// `url(`), with escapes resolved and surrounding whitespace dropped.
///
/// [§ 4.3.6 Consume a url token](https://www.w3.org/TR/css-syntax-3/#consume-url-token)
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn decode_url(source: &str, location: Location) -> String {
    // Skip the function name (handles escaped spellings of `url`) and the
    // opening parenthesis.
    let mut name = IdentSequenceIter::at(source, location);
    while name.next().is_some() {}
    let mut cursor = Tokenizer::at(source, name.position() as Location);
    if cursor.consume() != Some('(') {
        return String::new();
    }
    cursor.consume_whitespace();

    let mut value = String::new();
    loop {
        match cursor.consume() {
            Some(')') | None => return value,
            Some(c) if is_whitespace(c) => {
                // Trailing whitespace before the closing parenthesis.
                cursor.consume_whitespace();
            }
            Some('\\') => {
                if let Some(c) = cursor.consume_escaped_code_point() {
                    value.push(c);
                }
            }
            Some(c) => value.push(c),
        }
    }
}

/// The byte length of the token starting at `location`.
///
/// Re-reads the token with a fresh cursor; used by serialization to recover
/// a token's source text.
#[must_use]
pub fn token_extent(source: &str, location: Location) -> usize {
    let mut cursor = Tokenizer::at(source, location);
    let _ = cursor.next_token();
    cursor.position() - location as usize
}
