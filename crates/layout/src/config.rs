use vellum_types::geometry::Size;

/// Default page margin on every side, in points (half an inch).
pub const DEFAULT_MARGIN: f32 = 36.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Page size in points.
    pub size: Size,
    /// Margin applied on all four sides, in points.
    pub margin: f32,
}

impl PageGeometry {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            margin: DEFAULT_MARGIN,
        }
    }

    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    pub fn content_width(&self) -> f32 {
        self.size.width - 2.0 * self.margin
    }

    pub fn content_height(&self) -> f32 {
        self.size.height - 2.0 * self.margin
    }

    pub fn has_content_area(&self) -> bool {
        self.content_width() > 0.0 && self.content_height() > 0.0
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::new(Size::a4())
    }
}
