use serde::{Deserialize, Serialize};

use crate::layout::RenderError;

/// Points per millimetre.
const PT_PER_MM: f32 = 72.0 / 25.4;

/// Page dimensions and break threshold, in PDF points.
///
/// Y grows downwards from the top edge; the PDF writer flips it when serializing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    /// Left and right margin.
    pub margin: f32,
    pub top_margin: f32,
    /// A line whose baseline would land below this is moved to the next page.
    pub max_content_y: f32,
}

impl PageGeometry {
    /// A4 with 20 mm margins and the page break at 280 mm.
    pub fn a4() -> Self {
        Self {
            width: 595.28,
            height: 841.89,
            margin: 20.0 * PT_PER_MM,
            top_margin: 20.0 * PT_PER_MM,
            max_content_y: 280.0 * PT_PER_MM,
        }
    }

    /// US Letter with 0.75 in margins.
    pub fn letter() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
            margin: 54.0,
            top_margin: 54.0,
            max_content_y: 792.0 - 54.0,
        }
    }

    pub fn column_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    pub fn right_edge(&self) -> f32 {
        self.width - self.margin
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        let invalid = |reason: &str| {
            Err(RenderError::InvalidGeometry(reason.to_string()))
        };
        if !(self.width > 0.0 && self.height > 0.0) {
            return invalid("page dimensions must be positive");
        }
        if self.column_width() <= 0.0 {
            return invalid("margins leave no room for a column");
        }
        if self.max_content_y > self.height {
            return invalid("break threshold lies below the page edge");
        }
        if self.top_margin >= self.max_content_y {
            return invalid("top margin lies below the break threshold");
        }
        Ok(())
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// Named page sizes accepted in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

impl PageSize {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "a4" => Some(Self::A4),
            "letter" | "us-letter" => Some(Self::Letter),
            _ => None,
        }
    }

    pub fn geometry(self) -> PageGeometry {
        match self {
            Self::A4 => PageGeometry::a4(),
            Self::Letter => PageGeometry::letter(),
        }
    }
}
