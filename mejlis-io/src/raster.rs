//! SVG to bitmap conversion through resvg.

use std::sync::Arc;

use resvg::tiny_skia::{self, Pixmap, Transform};
use resvg::usvg;

use mejlis_renderer::{render_svg, RenderSettings, Scene};

use crate::error::ExportError;
use crate::settings::ExportSettings;

/// Rasterize an SVG document onto an opaque background.
pub fn rasterize(svg: &str, settings: &ExportSettings) -> Result<Pixmap, ExportError> {
    let mut options = usvg::Options::default();
    if settings.load_system_fonts {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();
        options.fontdb = Arc::new(fontdb);
    }

    let tree = usvg::Tree::from_str(svg, &options)?;
    let ratio = settings.pixel_ratio.max(0.01);
    let size = tree.size();
    let width = (size.width() * ratio).ceil() as u32;
    let height = (size.height() * ratio).ceil() as u32;

    let mut pixmap = Pixmap::new(width, height).ok_or(ExportError::Pixmap { width, height })?;
    let bg = settings.background;
    pixmap.fill(tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, 255));
    resvg::render(&tree, Transform::from_scale(ratio, ratio), &mut pixmap.as_mut());

    log::debug!("Rasterized SVG to {width}x{height} px");
    Ok(pixmap)
}

pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, ExportError> {
    pixmap
        .encode_png()
        .map_err(|e| ExportError::PngEncode(e.to_string()))
}

/// Render the scene's SVG and encode it as PNG.
pub fn export_png(
    scene: &Scene,
    render: &RenderSettings,
    settings: &ExportSettings,
) -> Result<Vec<u8>, ExportError> {
    if scene.is_empty() {
        return Err(ExportError::EmptyScene);
    }
    let svg = render_svg(scene, render);
    encode_png(&rasterize(&svg, settings)?)
}

/// Packed 8-bit RGB samples, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RgbImage {
    /// Drop the alpha channel, un-premultiplying each pixel first.
    pub fn from_pixmap(pixmap: &Pixmap) -> Self {
        let data = pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue()]
            })
            .collect();
        Self {
            width: pixmap.width(),
            height: pixmap.height(),
            data,
        }
    }
}
