//! Source regions - provenance tracking for parse tree nodes.
//!
//! A [`ParseRegion`] records where a node came from in the original query
//! text, as 1-based inclusive line/column coordinates. Regions compose via
//! [`ParseRegion::sum`] (a parent's region is the bounding box of its
//! children's regions) and render diagnostics via [`ParseRegion::annotate`],
//! which inserts caret markers into the source text.
//!
//! Nodes built by transform code rather than a parser carry no region at
//! all (`Option<ParseRegion>` is `None` throughout the tree API).

use std::fmt;

/// An immutable region of source text.
///
/// All four coordinates are 1-based and inclusive. A region whose start
/// equals its end is a *point*.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParseRegion {
    start_line: u32,
    start_col: u32,
    end_line: u32,
    end_col: u32,
}

impl ParseRegion {
    /// Create a region spanning `(start_line, start_col)` through
    /// `(end_line, end_col)`, inclusive.
    ///
    /// # Panics
    ///
    /// Panics if the end precedes the start.
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        if (end_line, end_col) < (start_line, start_col) {
            panic!(
                "region end {}:{} precedes start {}:{}",
                end_line, end_col, start_line, start_col
            );
        }
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Create a point region at a single position.
    pub fn point(line: u32, col: u32) -> Self {
        Self::new(line, col, line, col)
    }

    pub fn start_line(&self) -> u32 {
        self.start_line
    }

    pub fn start_col(&self) -> u32 {
        self.start_col
    }

    pub fn end_line(&self) -> u32 {
        self.end_line
    }

    pub fn end_col(&self) -> u32 {
        self.end_col
    }

    /// True if the region covers exactly one position.
    pub fn is_point(&self) -> bool {
        self.start_line == self.end_line && self.start_col == self.end_col
    }

    /// The minimal region covering both `self` and `other`.
    pub fn union(&self, other: &ParseRegion) -> ParseRegion {
        let (start_line, start_col) = (self.start_line, self.start_col)
            .min((other.start_line, other.start_col));
        let (end_line, end_col) =
            (self.end_line, self.end_col).max((other.end_line, other.end_col));
        ParseRegion {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// The minimal region covering every present region in `regions`.
    ///
    /// `None` entries are ignored; an empty or all-`None` collection yields
    /// `None`. Callers computing a parent node's region from its children
    /// must therefore supply at least one concrete region to get a result.
    pub fn sum<'a, I>(regions: I) -> Option<ParseRegion>
    where
        I: IntoIterator<Item = Option<&'a ParseRegion>>,
    {
        regions
            .into_iter()
            .flatten()
            .fold(None, |acc: Option<ParseRegion>, r| match acc {
                Some(a) => Some(a.union(r)),
                None => Some(*r),
            })
    }

    /// Insert caret markers into `source` at this region's boundaries.
    ///
    /// A `^` is inserted immediately before the region's start position.
    /// If the region is not a point, a second `^` is inserted one position
    /// past the region's end; when that insertion point falls past the end
    /// of the text the caret is appended instead.
    pub fn annotate(&self, source: &str) -> String {
        let mut chars: Vec<char> = source.chars().collect();
        let start = offset_of(source, self.start_line, self.start_col);
        let start = start.min(chars.len());
        chars.insert(start, '^');
        if !self.is_point() {
            // One past the end character, shifted by the caret just inserted.
            let end = offset_of(source, self.end_line, self.end_col) + 2;
            if end >= chars.len() {
                chars.push('^');
            } else {
                chars.insert(end, '^');
            }
        }
        chars.into_iter().collect()
    }

    /// Parse caret markers out of annotated text: the inverse of
    /// [`annotate`](Self::annotate).
    ///
    /// Returns the text with up to two `^` markers removed, and the region
    /// they denote: one caret yields a point region at the caret's
    /// position, two carets yield the region between the first caret and
    /// the position just before the second. Text without carets comes back
    /// unchanged with no region.
    pub fn find_carets(annotated: &str) -> (String, Option<ParseRegion>) {
        let mut chars: Vec<char> = annotated.chars().collect();
        let first = match chars.iter().position(|&c| c == '^') {
            Some(i) => i,
            None => return (annotated.to_string(), None),
        };
        chars.remove(first);
        let second = chars.iter().skip(first).position(|&c| c == '^').map(|i| i + first);
        if let Some(j) = second {
            chars.remove(j);
        }
        let clean: String = chars.iter().collect();
        let (start_line, start_col) = line_col_of(&clean, first);
        let region = match second {
            // The second caret sat one past the end character.
            Some(j) => {
                let (end_line, end_col) = line_col_of(&clean, j.saturating_sub(1));
                ParseRegion::new(start_line, start_col, end_line, end_col)
            }
            None => ParseRegion::point(start_line, start_col),
        };
        (clean, Some(region))
    }
}

impl fmt::Display for ParseRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_point() {
            write!(f, "[{}:{}]", self.start_line, self.start_col)
        } else {
            write!(
                f,
                "[{}:{}, {}:{}]",
                self.start_line, self.start_col, self.end_line, self.end_col
            )
        }
    }
}

/// Char offset of a 1-based (line, col) position.
///
/// `\r\n`, `\r`, and `\n` are all line terminators; at each scan position
/// the earliest-starting variant wins, so `\r\n` counts as one terminator.
fn offset_of(source: &str, line: u32, col: u32) -> usize {
    let chars: Vec<char> = source.chars().collect();
    let mut cur_line = 1u32;
    let mut cur_col = 1u32;
    let mut i = 0usize;
    while i < chars.len() {
        if cur_line == line && cur_col == col {
            return i;
        }
        match chars[i] {
            '\r' => {
                i += 1;
                if chars.get(i) == Some(&'\n') {
                    i += 1;
                }
                cur_line += 1;
                cur_col = 1;
            }
            '\n' => {
                i += 1;
                cur_line += 1;
                cur_col = 1;
            }
            _ => {
                i += 1;
                cur_col += 1;
            }
        }
    }
    chars.len()
}

/// 1-based (line, col) of a char offset. An offset at or past the end of
/// the text reports the position one past the final character.
fn line_col_of(source: &str, offset: usize) -> (u32, u32) {
    let chars: Vec<char> = source.chars().collect();
    let mut line = 1u32;
    let mut col = 1u32;
    let mut i = 0usize;
    while i < chars.len() && i < offset {
        match chars[i] {
            '\r' => {
                i += 1;
                if i < offset && chars.get(i) == Some(&'\n') {
                    i += 1;
                }
                line += 1;
                col = 1;
            }
            '\n' => {
                i += 1;
                line += 1;
                col = 1;
            }
            _ => {
                i += 1;
                col += 1;
            }
        }
    }
    (line, col)
}
