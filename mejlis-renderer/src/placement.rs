use serde::{Deserialize, Serialize};

/// Where an image of `width` x `height` lands when scaled to fit a page
/// and centered on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub draw_width: f64,
    pub draw_height: f64,
}

impl Placement {
    pub fn fit(width: f64, height: f64, page_width: f64, page_height: f64) -> Self {
        let scale = if width > 0.0 && height > 0.0 {
            (page_width / width).min(page_height / height)
        } else {
            1.0
        };
        let draw_width = width * scale;
        let draw_height = height * scale;
        Self {
            scale,
            offset_x: (page_width - draw_width) / 2.0,
            offset_y: (page_height - draw_height) / 2.0,
            draw_width,
            draw_height,
        }
    }
}
