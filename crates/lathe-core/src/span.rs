use std::fmt;

use serde::{Deserialize, Serialize};
use text_size::{TextRange, TextSize};

/// A byte-span into a source file.
///
/// Every node in a tree carries one, including nodes synthesized by a
/// handler: those inherit the span of the source element that triggered the
/// generation so diagnostics and debug line tables stay reproducible.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Zero-width span at `offset`.
    #[inline]
    pub const fn point(offset: u32) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Smallest span containing both `self` and `other`.
    #[must_use]
    pub fn cover(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({}..{})", self.start, self.end)
    }
}

impl From<Span> for TextRange {
    fn from(span: Span) -> Self {
        TextRange::new(TextSize::from(span.start), TextSize::from(span.end.max(span.start)))
    }
}

impl From<TextRange> for Span {
    fn from(range: TextRange) -> Self {
        Span::new(u32::from(range.start()), u32::from(range.end()))
    }
}
