//! MDX tokens - the atomic units of unparse output.
//!
//! Every node renders itself by pushing tokens into a [`TokenStream`],
//! which then serializes to query text. Tokens own the escaping rules:
//! quoted names double embedded `]` (see [`crate::ident::quote_mdx_name`]),
//! string literals double embedded `"`, symbols and operator names pass
//! through bare.

use rust_decimal::Decimal;

use crate::ident::{quote_mdx_name, Identifier};

/// An MDX output token.
///
/// Adding a variant here causes compile errors everywhere it needs to be
/// handled (exhaustive matching).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // === Keywords ===
    Select,
    From,
    Where,
    With,
    Member,
    Set,
    As,
    On,
    NonEmpty,
    DimensionProperties,
    CellProperties,
    Case,
    When,
    Then,
    Else,
    End,
    Cast,
    DrillThrough,
    MaxRows,
    FirstRowSet,
    Return,
    Null,

    // === Punctuation ===
    Comma,
    Dot,
    Eq,
    LParen,
    RParen,
    LBrace,
    RBrace,

    // === Whitespace / Formatting ===
    Space,
    Newline,
    /// Four spaces per level.
    Indent(usize),

    // === Dynamic Content ===
    /// A compound identifier, rendered per its segments' quoting rules.
    Ident(Identifier),
    /// A bare quoted name segment: `[name]` with `]` doubling.
    QuotedName(String),
    /// A bare name: operator names, property names, cell property names.
    Name(String),
    /// String literal: `"..."` with embedded `"` doubled.
    LitString(String),
    /// Exact numeric literal.
    LitNumber(Decimal),
    /// Symbol literal (`ASC`, `DESC`, ...), rendered bare.
    Symbol(String),
    /// Pre-rendered text: metadata unique names, axis names.
    Raw(String),
}

impl Token {
    /// Serialize this token to MDX text.
    pub fn serialize(&self) -> String {
        match self {
            Token::Select => "SELECT".into(),
            Token::From => "FROM".into(),
            Token::Where => "WHERE".into(),
            Token::With => "WITH".into(),
            Token::Member => "MEMBER".into(),
            Token::Set => "SET".into(),
            Token::As => "AS".into(),
            Token::On => "ON".into(),
            Token::NonEmpty => "NON EMPTY".into(),
            Token::DimensionProperties => "DIMENSION PROPERTIES".into(),
            Token::CellProperties => "CELL PROPERTIES".into(),
            Token::Case => "CASE".into(),
            Token::When => "WHEN".into(),
            Token::Then => "THEN".into(),
            Token::Else => "ELSE".into(),
            Token::End => "END".into(),
            Token::Cast => "CAST".into(),
            Token::DrillThrough => "DRILLTHROUGH".into(),
            Token::MaxRows => "MAXROWS".into(),
            Token::FirstRowSet => "FIRSTROWSET".into(),
            Token::Return => "RETURN".into(),
            Token::Null => "NULL".into(),

            Token::Comma => ",".into(),
            Token::Dot => ".".into(),
            Token::Eq => "=".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),
            Token::LBrace => "{".into(),
            Token::RBrace => "}".into(),

            Token::Space => " ".into(),
            Token::Newline => "\n".into(),
            Token::Indent(n) => "    ".repeat(*n),

            Token::Ident(ident) => ident.to_string(),
            Token::QuotedName(name) => quote_mdx_name(name),
            Token::Name(name) => name.clone(),
            Token::LitString(s) => format!("\"{}\"", s.replace('"', "\"\"")),
            Token::LitNumber(n) => n.to_string(),
            Token::Symbol(s) => s.clone(),
            Token::Raw(s) => s.clone(),
        }
    }
}

/// A stream of tokens that serializes to MDX text - the output sink of the
/// unparse protocol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Create an empty token stream.
    pub fn new() -> Self {
        Self { tokens: vec![] }
    }

    /// Push a single token.
    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    /// Extend with multiple tokens.
    pub fn extend(&mut self, tokens: impl IntoIterator<Item = Token>) -> &mut Self {
        self.tokens.extend(tokens);
        self
    }

    /// Append another token stream.
    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend(other.tokens.iter().cloned());
        self
    }

    /// Serialize all tokens to MDX text.
    pub fn serialize(&self) -> String {
        self.tokens.iter().map(Token::serialize).collect()
    }

    // Convenience methods for common tokens
    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }
    pub fn newline(&mut self) -> &mut Self {
        self.push(Token::Newline)
    }
    pub fn indent(&mut self, n: usize) -> &mut Self {
        self.push(Token::Indent(n))
    }
    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }
    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }
    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }
    pub fn lbrace(&mut self) -> &mut Self {
        self.push(Token::LBrace)
    }
    pub fn rbrace(&mut self) -> &mut Self {
        self.push(Token::RBrace)
    }
}

/// The uniform rendering protocol.
///
/// A node renders itself and only itself, delegating explicitly to its
/// children's `unparse`. [`Unparse::to_mdx`] is the rendering entry point
/// used by `Display` impls and callers wanting a string.
pub trait Unparse {
    /// Render this node into the token stream.
    fn unparse(&self, ts: &mut TokenStream);

    /// Render this node to an MDX string.
    fn to_mdx(&self) -> String {
        let mut ts = TokenStream::new();
        self.unparse(&mut ts);
        ts.serialize()
    }
}

/// Unparse `items` separated by `", "`.
pub(crate) fn unparse_comma_list<T: Unparse>(items: &[T], ts: &mut TokenStream) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            ts.comma().space();
        }
        item.unparse(ts);
    }
}
