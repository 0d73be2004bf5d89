//! CSS token types per [CSS Syntax Level 3 § 4](https://www.w3.org/TR/css-syntax-3/#tokenization).
//!
//! "The output of the tokenization step is a stream of zero or more of the
//! following tokens: <ident-token>, <function-token>, <at-keyword-token>,
//! <hash-token>, <string-token>, <bad-string-token>, <url-token>,
//! <bad-url-token>, <delim-token>, <number-token>, <percentage-token>,
//! <dimension-token>, <whitespace-token>, <CDO-token>, <CDC-token>,
//! <colon-token>, <semicolon-token>, <comma-token>, <[-token>, <]-token>,
//! <(-token>, <)-token>, <{-token>, and <}-token>."
//!
//! Tokens here are *spans*: a tag plus the byte offset where the token
//! starts. Identifier text is never materialized by the tokenizer; consumers
//! that need it decode lazily from the source (see
//! [`super::tokenizer::IdentSequenceIter`]). Numeric tokens carry their
//! pre-parsed value in the tag.

use core::fmt;

/// The unit class of a `<dimension-token>`.
///
/// [§ 4.1 Lengths](https://www.w3.org/TR/css-values-4/#lengths)
///
/// "A dimension is a <number> immediately followed by a unit identifier."
///
/// The unit identifier is classified at tokenize time so value parsers never
/// have to re-scan the source for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionUnit {
    /// [§ 6.1 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
    /// "1px = 1/96th of 1in"
    Px,
    /// Any other unit identifier. The token is preserved but no value parser
    /// accepts it.
    Unrecognized,
}

/// A byte offset into the source text where a token starts.
///
/// [§ 3 Tokenizing and Parsing CSS](https://www.w3.org/TR/css-syntax-3/#tokenizing-and-parsing)
///
/// Locations identify tokens for the lifetime of the source; every consumer
/// that needs token *text* (identifier comparison, url decoding) starts from
/// the location.
pub type Location = u32;

/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#token-diagrams)
///
/// CSS token tags as defined by the CSS Syntax Module Level 3 specification.
/// Small payloads (delimiter codepoint, pre-parsed numeric values) ride in
/// the tag; textual payloads stay in the source and are addressed by the
/// token's location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenTag {
    /// "<ident-token>" — name starts at the token location.
    Ident,

    /// "<function-token>" — name starts at the token location; the opening
    /// parenthesis has been consumed.
    Function,

    /// "<at-keyword-token>" — name starts one byte past the `@`.
    AtKeyword,

    /// "<hash-token>" with type flag "id" — value starts one byte past `#`.
    HashId,

    /// "<hash-token>" with type flag "unrestricted".
    HashUnrestricted,

    /// "<string-token>" — the quoted text starts at the token location.
    String,

    /// "<bad-string-token>" — "represents a parsing error"
    BadString,

    /// "<url-token>" — the whole `url(...)` form starts at the location.
    Url,

    /// "<bad-url-token>" — "represents a parsing error"
    BadUrl,

    /// "<delim-token>" — "has a value composed of a single code point"
    Delim(char),

    /// "<number-token>" with type flag "integer".
    ///
    /// The value is pre-parsed; out-of-range integers collapse to 0.
    Integer(i32),

    /// "<number-token>" with type flag "number".
    Number(f32),

    /// "<percentage-token>" — the numeric value (50 for `50%`).
    Percentage(f32),

    /// "<dimension-token>" — numeric value plus classified unit.
    Dimension {
        /// The numeric part of the dimension.
        number: f32,
        /// The unit identifier, classified.
        unit: DimensionUnit,
    },

    /// "<whitespace-token>" — "represents one or more whitespace code points"
    Whitespace,

    /// A `/* ... */` comment. Comments are tokens of their own so consumers
    /// can skip them without the tokenizer losing source positions.
    Comment,

    /// "<CDO-token>" — `<!--`
    Cdo,

    /// "<CDC-token>" — `-->`
    Cdc,

    /// "<colon-token>"
    Colon,

    /// "<semicolon-token>"
    Semicolon,

    /// "<comma-token>"
    Comma,

    /// "<[-token>"
    LeftBracket,

    /// "<]-token>"
    RightBracket,

    /// "<(-token>"
    LeftParen,

    /// "<)-token>"
    RightParen,

    /// "<{-token>"
    LeftCurly,

    /// "<}-token>"
    RightCurly,

    /// End of input.
    Eof,
}

/// A single token: a tag plus the byte offset where it starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    /// What kind of token this is (with any small payload).
    pub tag: TokenTag,
    /// Byte offset of the token's first code point in the source.
    pub location: Location,
}

impl Token {
    /// Returns true if this is an EOF token.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        matches!(self.tag, TokenTag::Eof)
    }

    /// Returns true if this is a whitespace or comment token.
    #[must_use]
    pub fn is_space(&self) -> bool {
        matches!(self.tag, TokenTag::Whitespace | TokenTag::Comment)
    }
}

impl fmt::Display for TokenTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenTag::Ident => write!(f, "<ident>"),
            TokenTag::Function => write!(f, "<function>"),
            TokenTag::AtKeyword => write!(f, "<at-keyword>"),
            TokenTag::HashId => write!(f, "<hash id>"),
            TokenTag::HashUnrestricted => write!(f, "<hash unrestricted>"),
            TokenTag::String => write!(f, "<string>"),
            TokenTag::BadString => write!(f, "<bad-string>"),
            TokenTag::Url => write!(f, "<url>"),
            TokenTag::BadUrl => write!(f, "<bad-url>"),
            TokenTag::Delim(c) => write!(f, "<delim:{c}>"),
            TokenTag::Integer(v) => write!(f, "<integer:{v}>"),
            TokenTag::Number(v) => write!(f, "<number:{v}>"),
            TokenTag::Percentage(v) => write!(f, "<percentage:{v}%>"),
            TokenTag::Dimension { number, .. } => write!(f, "<dimension:{number}>"),
            TokenTag::Whitespace => write!(f, "<whitespace>"),
            TokenTag::Comment => write!(f, "<comment>"),
            TokenTag::Cdo => write!(f, "<CDO>"),
            TokenTag::Cdc => write!(f, "<CDC>"),
            TokenTag::Colon => write!(f, "<colon>"),
            TokenTag::Semicolon => write!(f, "<semicolon>"),
            TokenTag::Comma => write!(f, "<comma>"),
            TokenTag::LeftBracket => write!(f, "<[>"),
            TokenTag::RightBracket => write!(f, "<]>"),
            TokenTag::LeftParen => write!(f, "<(>"),
            TokenTag::RightParen => write!(f, "<)>"),
            TokenTag::LeftCurly => write!(f, "<{{>"),
            TokenTag::RightCurly => write!(f, "<}}>"),
            TokenTag::Eof => write!(f, "<EOF>"),
        }
    }
}
