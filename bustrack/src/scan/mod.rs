//! Scan viewport geometry
//!
//! Decides whether a decoded barcode sits fully inside the on-screen scan
//! window. Codes that are only partly in frame are rejected.
//!
//! Coordinates are on-screen pixels with the origin at the top-left corner.

use serde::{Deserialize, Serialize};

/// A point in screen pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanPoint {
    pub x: f64,
    pub y: f64,
}

impl ScanPoint {
    /// Creates a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The rectangle of the display that counts as "in scan range".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanViewport {
    pub origin_x: f64,
    pub origin_y: f64,
    pub width: f64,
    pub height: f64,
}

impl ScanViewport {
    /// Creates a viewport from its top-left corner and size.
    pub const fn new(origin_x: f64, origin_y: f64, width: f64, height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            width,
            height,
        }
    }

    /// Recomputes the scan window for a display size.
    ///
    /// The window is a square centered on the display whose side is
    /// `fraction` of the shorter display edge. `fraction` is clamped to
    /// `(0, 1]`.
    pub fn centered(display_width: f64, display_height: f64, fraction: f64) -> Self {
        let fraction = if fraction > 0.0 { fraction.min(1.0) } else { 1.0 };
        let side = display_width.min(display_height) * fraction;
        Self::new(
            (display_width - side) / 2.0,
            (display_height - side) / 2.0,
            side,
            side,
        )
    }

    /// Right edge (inclusive).
    pub fn max_x(&self) -> f64 {
        self.origin_x + self.width
    }

    /// Bottom edge (inclusive).
    pub fn max_y(&self) -> f64 {
        self.origin_y + self.height
    }
}

/// Axis-aligned bounding box of a set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Bounding box of `points`, or `None` if there are none.
    pub fn of(points: &[ScanPoint]) -> Option<Self> {
        let first = points.first()?;
        let init = Bounds {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        Some(points[1..].iter().fold(init, |b, p| Bounds {
            min_x: b.min_x.min(p.x),
            max_x: b.max_x.max(p.x),
            min_y: b.min_y.min(p.y),
            max_y: b.max_y.max(p.y),
        }))
    }
}

/// Returns true iff the bounding box of `corners` lies fully inside the
/// viewport. Boundaries are inclusive; an empty corner set is rejected.
pub fn is_within_viewport(corners: &[ScanPoint], viewport: &ScanViewport) -> bool {
    let Some(b) = Bounds::of(corners) else {
        return false;
    };

    b.min_x >= viewport.origin_x
        && b.max_x <= viewport.max_x()
        && b.min_y >= viewport.origin_y
        && b.max_y <= viewport.max_y()
}

/// One decoded code from the scanner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannedCode {
    /// Decoded text payload.
    pub value: String,
    /// Corner points in pixel space, in scanner order.
    pub corners: Vec<ScanPoint>,
}

/// One scanner callback, carrying every code decoded in a frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScanEvent {
    pub codes: Vec<ScannedCode>,
}

impl ScanEvent {
    /// Event carrying a single code.
    pub fn single(value: impl Into<String>, corners: Vec<ScanPoint>) -> Self {
        Self {
            codes: vec![ScannedCode {
                value: value.into(),
                corners,
            }],
        }
    }
}
