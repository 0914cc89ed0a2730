use serde::{Deserialize, Serialize};

use mejlis_renderer::Color;

/// Output options for raster and PDF export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// PDF page width in points (A4 landscape).
    pub page_width: f64,
    pub page_height: f64,
    /// Padding around the drawn pieces on the PDF page, in scene units.
    pub pdf_padding: f64,
    /// Device pixels per scene unit when rasterizing.
    pub pixel_ratio: f32,
    pub background: Color,
    pub png_file_name: String,
    pub pdf_file_name: String,
    pub svg_file_name: String,
    /// Without system fonts the labels are not drawn into raster output.
    pub load_system_fonts: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            page_width: 842.0,
            page_height: 595.0,
            pdf_padding: 20.0,
            pixel_ratio: 1.0,
            background: Color::WHITE,
            png_file_name: "room-shape.png".to_string(),
            pdf_file_name: "room-shape.pdf".to_string(),
            svg_file_name: "room-shape.svg".to_string(),
            load_system_fonts: true,
        }
    }
}
