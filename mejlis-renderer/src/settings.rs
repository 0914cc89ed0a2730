use serde::{Deserialize, Serialize};

use mejlis_core::Point;

use crate::palette::{default_palette, Color};

/// Drawing parameters for the floor-plan preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Pixels per length unit.
    pub scale: f64,
    /// Depth of every seating piece, in pixels.
    pub thickness: f64,
    /// Gap left between consecutive pieces, in pixels.
    pub spacing: f64,
    /// Length of a corner block, in units.
    pub corner_length: u32,
    /// Where the walk starts.
    pub origin: Point,
    /// Padding around the drawing in the exported view box.
    pub margin: f64,
    pub corner_radius: f64,
    pub stroke_width: f64,
    pub font_size: f64,
    pub palette: Vec<Color>,
    pub corner_color: Color,
    pub stroke_color: Color,
    pub label_color: Color,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            scale: 50.0,
            thickness: 40.0,
            spacing: 4.0,
            corner_length: 1,
            origin: Point::new(200.0, 200.0),
            margin: 30.0,
            corner_radius: 4.0,
            stroke_width: 1.0,
            font_size: 12.0,
            palette: default_palette(),
            corner_color: Color::rgb(0x88, 0x88, 0x88),
            stroke_color: Color::BLACK,
            label_color: Color::WHITE,
        }
    }
}

impl RenderSettings {
    /// Fill for segment `segment_index` of side `side_index` (both 0-based).
    pub fn segment_color(&self, side_index: usize, segment_index: usize) -> Color {
        if self.palette.is_empty() {
            return self.corner_color;
        }
        self.palette[(side_index + segment_index) % self.palette.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_cycles() {
        let settings = RenderSettings::default();
        assert_eq!(settings.segment_color(0, 0), settings.palette[0]);
        assert_eq!(settings.segment_color(2, 5), settings.palette[1]);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings: RenderSettings = serde_json::from_str(r#"{"scale": 25}"#).unwrap();
        assert!((settings.scale - 25.0).abs() < 1e-10);
        assert!((settings.thickness - 40.0).abs() < 1e-10);
        assert_eq!(settings.palette.len(), 6);
    }

    #[test]
    fn test_empty_palette_falls_back() {
        let settings = RenderSettings {
            palette: Vec::new(),
            ..RenderSettings::default()
        };
        assert_eq!(settings.segment_color(1, 1), settings.corner_color);
    }
}
