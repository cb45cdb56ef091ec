//! Axis-aligned geometry in micrometers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The direction in which successive tracks advance.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dir {
    /// Tracks advance along x; shapes are vertical bars.
    Horiz,
    /// Tracks advance along y; shapes are horizontal bars.
    Vert,
}

impl Dir {
    #[inline]
    pub fn other(&self) -> Self {
        match self {
            Dir::Horiz => Dir::Vert,
            Dir::Vert => Dir::Horiz,
        }
    }
}

/// A closed interval `[start, stop]`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    start: Decimal,
    stop: Decimal,
}

impl Span {
    /// Creates a span; the endpoints may be given in either order.
    pub fn new(start: Decimal, stop: Decimal) -> Self {
        Self {
            start: start.min(stop),
            stop: start.max(stop),
        }
    }

    pub fn from_center_width(center: Decimal, width: Decimal) -> Self {
        let half = width / Decimal::TWO;
        Self::new(center - half, center + half)
    }

    #[inline]
    pub fn start(&self) -> Decimal {
        self.start
    }

    #[inline]
    pub fn stop(&self) -> Decimal {
        self.stop
    }

    #[inline]
    pub fn length(&self) -> Decimal {
        self.stop - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length().is_zero()
    }

    /// True if the interiors of the two spans intersect.
    #[inline]
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.stop && other.start < self.stop
    }

    #[inline]
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.stop <= self.stop
    }
}

/// Returns the parts of `extent` not covered by `occupied`.
///
/// `occupied` must be sorted by start coordinate. Empty gaps are dropped.
pub fn gaps(extent: Span, occupied: impl IntoIterator<Item = Span>) -> Vec<Span> {
    let mut out = Vec::new();
    let mut prev = extent.start();
    for span in occupied {
        if span.start() > prev {
            out.push(Span::new(prev, span.start()));
        }
        prev = prev.max(span.stop());
    }
    if extent.stop() > prev {
        out.push(Span::new(prev, extent.stop()));
    }
    out
}

/// An axis-aligned rectangle with lower-left corner `(x0, y0)`
/// and upper-right corner `(x1, y1)`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x0: Decimal,
    pub y0: Decimal,
    pub x1: Decimal,
    pub y1: Decimal,
}

impl Rect {
    pub fn new(x0: Decimal, y0: Decimal, x1: Decimal, y1: Decimal) -> Self {
        Self::from_spans(Span::new(x0, x1), Span::new(y0, y1))
    }

    pub fn from_spans(hspan: Span, vspan: Span) -> Self {
        Self {
            x0: hspan.start(),
            y0: vspan.start(),
            x1: hspan.stop(),
            y1: vspan.stop(),
        }
    }

    /// Builds a rectangle from its extent `along` the track direction `dir`
    /// and its extent `across` it.
    pub fn from_dir_spans(dir: Dir, along: Span, across: Span) -> Self {
        match dir {
            Dir::Vert => Self::from_spans(across, along),
            Dir::Horiz => Self::from_spans(along, across),
        }
    }

    #[inline]
    pub fn hspan(&self) -> Span {
        Span::new(self.x0, self.x1)
    }

    #[inline]
    pub fn vspan(&self) -> Span {
        Span::new(self.y0, self.y1)
    }

    /// The extent of this rectangle along tracks advancing in `dir`.
    #[inline]
    pub fn span(&self, dir: Dir) -> Span {
        match dir {
            Dir::Horiz => self.hspan(),
            Dir::Vert => self.vspan(),
        }
    }

    #[inline]
    pub fn width(&self) -> Decimal {
        self.x1 - self.x0
    }

    #[inline]
    pub fn height(&self) -> Decimal {
        self.y1 - self.y0
    }

    #[inline]
    pub fn area(&self) -> Decimal {
        self.width() * self.height()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width().is_zero() || self.height().is_zero()
    }

    /// True if the interiors of the two rectangles intersect.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.hspan().overlaps(&other.hspan()) && self.vspan().overlaps(&other.vspan())
    }

    pub fn contains(&self, other: &Rect) -> bool {
        self.hspan().contains(&other.hspan()) && self.vspan().contains(&other.vspan())
    }
}
