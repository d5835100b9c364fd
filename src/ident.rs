//! Compound identifiers - the `[Store].[USA].&[45]` model.
//!
//! An [`Identifier`] is an ordered, non-empty sequence of [`Segment`]s.
//! Each segment is either a name (quoted or unquoted) or a compound key
//! (one or more `&`-prefixed sub-names). Rendering and parsing are exact
//! inverses: any identifier produced by [`Identifier::to_string`]
//! re-parses to the same segment sequence.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

// =============================================================================
// Quoting
// =============================================================================

/// How a segment is written in query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Quoting {
    /// Written bare: `Measures`.
    Unquoted,
    /// Written in brackets: `[Measures]`.
    Quoted,
    /// Written as a key: `&[45]` or `&[WA]&[USA]`. Only key segments carry
    /// this quoting.
    Key,
}

// =============================================================================
// Segments
// =============================================================================

/// A plain name segment, quoted or unquoted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NameSegment {
    name: String,
    quoting: Quoting,
}

impl NameSegment {
    /// Create a name segment.
    ///
    /// # Panics
    ///
    /// Panics if `quoting` is [`Quoting::Key`]; keys are modelled by
    /// [`KeySegment`].
    pub fn new(name: impl Into<String>, quoting: Quoting) -> Self {
        if quoting == Quoting::Key {
            panic!("KEY quoting applies to key segments, not name segments");
        }
        Self {
            name: name.into(),
            quoting,
        }
    }

    /// A bracket-quoted name segment.
    pub fn quoted(name: impl Into<String>) -> Self {
        Self::new(name, Quoting::Quoted)
    }

    /// A bare name segment.
    pub fn unquoted(name: impl Into<String>) -> Self {
        Self::new(name, Quoting::Unquoted)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quoting(&self) -> Quoting {
        self.quoting
    }
}

impl fmt::Display for NameSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.quoting {
            Quoting::Unquoted => f.write_str(&self.name),
            _ => f.write_str(&quote_mdx_name(&self.name)),
        }
    }
}

/// A compound key segment: one or more `&`-prefixed sub-names jointly
/// identifying a member by key value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeySegment {
    parts: Vec<NameSegment>,
}

impl KeySegment {
    /// Create a key segment from its sub-names.
    ///
    /// # Panics
    ///
    /// Panics on an empty part list.
    pub fn new(parts: Vec<NameSegment>) -> Self {
        if parts.is_empty() {
            panic!("key segment requires at least one sub-segment");
        }
        Self { parts }
    }

    /// A key segment with a single bracket-quoted part.
    pub fn quoted(name: impl Into<String>) -> Self {
        Self::new(vec![NameSegment::quoted(name)])
    }

    pub fn parts(&self) -> &[NameSegment] {
        &self.parts
    }
}

impl fmt::Display for KeySegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            write!(f, "&{}", part)?;
        }
        Ok(())
    }
}

/// One dot-separated component of a compound identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Segment {
    Name(NameSegment),
    Key(KeySegment),
}

impl Segment {
    /// The segment's quoting discipline.
    pub fn quoting(&self) -> Quoting {
        match self {
            Segment::Name(s) => s.quoting(),
            Segment::Key(_) => Quoting::Key,
        }
    }

    /// The segment's name, for name segments. Key segments have no single
    /// name.
    pub fn name(&self) -> Option<&str> {
        match self {
            Segment::Name(s) => Some(s.name()),
            Segment::Key(_) => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Name(s) => write!(f, "{}", s),
            Segment::Key(k) => write!(f, "{}", k),
        }
    }
}

impl From<NameSegment> for Segment {
    fn from(s: NameSegment) -> Self {
        Segment::Name(s)
    }
}

impl From<KeySegment> for Segment {
    fn from(k: KeySegment) -> Self {
        Segment::Key(k)
    }
}

// =============================================================================
// Identifier
// =============================================================================

/// A compound identifier: an ordered, non-empty sequence of segments.
///
/// Identifiers are immutable; [`Identifier::append`] returns a new
/// identifier sharing no mutable state with the original.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Identifier {
    segments: Vec<Segment>,
}

impl Identifier {
    /// Create an identifier from its segments.
    ///
    /// # Panics
    ///
    /// Panics on an empty segment list.
    pub fn new(segments: Vec<Segment>) -> Self {
        if segments.is_empty() {
            panic!("identifier requires at least one segment");
        }
        Self { segments }
    }

    /// An identifier with a single bracket-quoted segment.
    pub fn quoted(name: impl Into<String>) -> Self {
        Self::new(vec![NameSegment::quoted(name).into()])
    }

    /// An identifier of bracket-quoted segments, one per name.
    pub fn of_quoted<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            names
                .into_iter()
                .map(|n| NameSegment::quoted(n).into())
                .collect(),
        )
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// A new identifier with `segment` appended. The original is untouched.
    pub fn append(&self, segment: impl Into<Segment>) -> Identifier {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Identifier { segments }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for Identifier {
    type Err = IdentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_identifier(s)
    }
}

// =============================================================================
// Bracket escaping
// =============================================================================

/// Quote a raw name for MDX: `[` + name + `]`, doubling each embedded `]`
/// unless it is immediately followed by `.` in the raw name. The exception
/// keeps segment boundaries that were written as literal text (for example
/// a pre-rendered unique name) from being over-escaped.
pub fn quote_mdx_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 2);
    out.push('[');
    for (i, &c) in chars.iter().enumerate() {
        out.push(c);
        if c == ']' && chars.get(i + 1) != Some(&'.') {
            out.push(']');
        }
    }
    out.push(']');
    out
}

// =============================================================================
// Parsing
// =============================================================================

/// Identifier parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentError {
    #[error("empty identifier")]
    Empty,
    #[error("empty segment at offset {offset}")]
    EmptySegment { offset: usize },
    #[error("unterminated '[' at offset {offset}")]
    UnterminatedBracket { offset: usize },
    #[error("identifier ends with '.'")]
    TrailingDot,
    #[error("'&' without a key value at offset {offset}")]
    EmptyKey { offset: usize },
    #[error("expected '.' between segments at offset {offset}")]
    ExpectedDot { offset: usize },
}

/// Parse a compound identifier: the inverse of [`Identifier`]'s rendering.
///
/// Handles quoted segments (`]]` unescapes to `]`), unquoted segments, and
/// `&`-key segments with one or more parts.
pub fn parse_identifier(input: &str) -> Result<Identifier, IdentError> {
    let chars: Vec<char> = input.chars().collect();
    if chars.is_empty() {
        return Err(IdentError::Empty);
    }
    let mut segments = Vec::new();
    let mut i = 0usize;
    loop {
        if chars[i] == '&' {
            segments.push(Segment::Key(parse_key_segment(&chars, &mut i)?));
        } else {
            segments.push(Segment::Name(parse_name_segment(&chars, &mut i)?));
        }
        if i == chars.len() {
            break;
        }
        if chars[i] != '.' {
            return Err(IdentError::ExpectedDot { offset: i });
        }
        i += 1;
        if i == chars.len() {
            return Err(IdentError::TrailingDot);
        }
    }
    Ok(Identifier::new(segments))
}

/// Parse one name part starting at `*i`: either `[...]` or a bare name
/// running to the next `.`, `&`, or end of input. Leaves `*i` on the
/// terminator.
fn parse_name_segment(chars: &[char], i: &mut usize) -> Result<NameSegment, IdentError> {
    if chars[*i] == '[' {
        let open = *i;
        *i += 1;
        let mut name = String::new();
        loop {
            match chars.get(*i) {
                None => return Err(IdentError::UnterminatedBracket { offset: open }),
                Some(']') => {
                    if chars.get(*i + 1) == Some(&']') {
                        name.push(']');
                        *i += 2;
                    } else {
                        *i += 1;
                        return Ok(NameSegment::quoted(name));
                    }
                }
                Some(&c) => {
                    name.push(c);
                    *i += 1;
                }
            }
        }
    } else {
        let start = *i;
        let mut name = String::new();
        while let Some(&c) = chars.get(*i) {
            if c == '.' || c == '&' {
                break;
            }
            name.push(c);
            *i += 1;
        }
        if name.is_empty() {
            return Err(IdentError::EmptySegment { offset: start });
        }
        Ok(NameSegment::unquoted(name))
    }
}

/// Parse a key segment starting at the `&` at `*i`: one or more
/// `&`-prefixed parts.
fn parse_key_segment(chars: &[char], i: &mut usize) -> Result<KeySegment, IdentError> {
    let mut parts = Vec::new();
    while chars.get(*i) == Some(&'&') {
        let amp = *i;
        *i += 1;
        if *i == chars.len() || chars[*i] == '.' || chars[*i] == '&' {
            return Err(IdentError::EmptyKey { offset: amp });
        }
        parts.push(parse_name_segment(chars, i)?);
    }
    Ok(KeySegment::new(parts))
}
