use serde::{Deserialize, Serialize};

pub const POINTS_PER_INCH: f32 = 72.0;
pub const MM_PER_INCH: f32 = 25.4;

/// A4 in millimetres, the page size used when none is configured.
pub const A4_MM: (f32, f32) = (210.0, 297.0);

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
        }
    }

    /// A4 expressed in PDF points.
    pub fn a4() -> Self {
        Self {
            width: PageSizeUnits::Mm.to_points(A4_MM.0),
            height: PageSizeUnits::Mm.to_points(A4_MM.1),
        }
    }
}

/// Unit used for caller-supplied page dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSizeUnits {
    #[default]
    Mm,
    Inches,
}

impl PageSizeUnits {
    pub fn to_points(self, value: f32) -> f32 {
        match self {
            PageSizeUnits::Mm => value / MM_PER_INCH * POINTS_PER_INCH,
            PageSizeUnits::Inches => value * POINTS_PER_INCH,
        }
    }

    pub fn is_inches(self) -> bool {
        self == PageSizeUnits::Inches
    }
}

/// The page size requested by the caller.
///
/// Width and height are either both present or both absent; anything else is an
/// inconsistent request that callers must reject before laying out.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PageDimensions {
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub units: PageSizeUnits,
}

impl PageDimensions {
    pub fn new(width: Option<f32>, height: Option<f32>, units: PageSizeUnits) -> Self {
        Self {
            width,
            height,
            units,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.width.is_some() == self.height.is_some()
    }

    /// Resolves the requested dimensions to points, falling back to `default`
    /// when neither dimension is set. Returns `None` when only one is set.
    pub fn resolve(&self, default: Size) -> Option<Size> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(Size::new(
                self.units.to_points(w),
                self.units.to_points(h),
            )),
            (None, None) => Some(default),
            _ => None,
        }
    }
}
