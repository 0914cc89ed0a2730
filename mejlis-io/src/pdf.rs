//! Single-page PDF output.
//!
//! The drawing is rasterized and embedded as one Flate-compressed
//! DeviceRGB image XObject, scaled to fit the page and centered.
//!
//! ## Object layout
//! 1 Catalog → 2 Pages → 3 Page → (4 Image XObject, 5 Content stream).

use miniz_oxide::deflate::compress_to_vec_zlib;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref};

use mejlis_renderer::{render_svg_with_view, Placement, RenderSettings, Scene};

use crate::error::ExportError;
use crate::raster::{rasterize, RgbImage};
use crate::settings::ExportSettings;

const IMAGE_NAME: Name<'static> = Name(b"Im0");

/// zlib level used for the image samples.
const COMPRESSION_LEVEL: u8 = 6;

/// Render the scene tightly around its pieces (plus padding) and place it
/// on a landscape page.
pub fn export_pdf(
    scene: &Scene,
    render: &RenderSettings,
    settings: &ExportSettings,
) -> Result<Vec<u8>, ExportError> {
    let view = scene
        .content_bounds()
        .ok_or(ExportError::EmptyScene)?
        .padded(settings.pdf_padding);
    let svg = render_svg_with_view(scene, render, &view);
    let image = RgbImage::from_pixmap(&rasterize(&svg, settings)?);
    let placement = Placement::fit(
        view.width(),
        view.height(),
        settings.page_width,
        settings.page_height,
    );

    let bytes = image_page(&image, settings.page_width, settings.page_height, &placement);
    log::debug!(
        "PDF page: image {}x{} px drawn at scale {:.3}, {} bytes",
        image.width,
        image.height,
        placement.scale,
        bytes.len()
    );
    Ok(bytes)
}

/// Build a one-page document showing `image` at `placement`.
fn image_page(
    image: &RgbImage,
    page_width: f64,
    page_height: f64,
    placement: &Placement,
) -> Vec<u8> {
    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let page_id = Ref::new(3);
    let image_id = Ref::new(4);
    let content_id = Ref::new(5);

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id).kids([page_id]).count(1);

    let mut page = pdf.page(page_id);
    page.media_box(Rect::new(0.0, 0.0, page_width as f32, page_height as f32));
    page.parent(page_tree_id);
    page.contents(content_id);
    page.resources().x_objects().pair(IMAGE_NAME, image_id);
    page.finish();

    let samples = compress_to_vec_zlib(&image.data, COMPRESSION_LEVEL);
    let mut xobject = pdf.image_xobject(image_id, &samples);
    xobject.filter(Filter::FlateDecode);
    xobject.width(image.width as i32);
    xobject.height(image.height as i32);
    xobject.color_space().device_rgb();
    xobject.bits_per_component(8);
    xobject.finish();

    // PDF space has its origin at the bottom-left corner.
    let bottom = page_height - placement.offset_y - placement.draw_height;
    let mut content = Content::new();
    content.save_state();
    content.transform([
        placement.draw_width as f32,
        0.0,
        0.0,
        placement.draw_height as f32,
        placement.offset_x as f32,
        bottom as f32,
    ]);
    content.x_object(IMAGE_NAME);
    content.restore_state();
    pdf.stream(content_id, &content.finish());

    pdf.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mejlis_core::{RoomPlan, RoomShape};
    use mejlis_renderer::layout_plan;
    use miniz_oxide::inflate::decompress_to_vec_zlib;

    fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
        haystack[from..]
            .windows(needle.len())
            .position(|w| w == needle)
            .map(|i| i + from)
    }

    /// Raw bytes of the first stream following `marker`.
    fn stream_after<'a>(pdf: &'a [u8], marker: &[u8]) -> &'a [u8] {
        let at = find(pdf, marker, 0).unwrap();
        let start = find(pdf, b"stream\n", at).unwrap() + b"stream\n".len();
        let end = find(pdf, b"\nendstream", start).unwrap();
        &pdf[start..end]
    }

    #[test]
    fn test_image_page_structure() {
        let image = RgbImage {
            width: 2,
            height: 1,
            data: vec![255, 0, 0, 0, 0, 255],
        };
        let placement = Placement::fit(2.0, 1.0, 842.0, 595.0);
        let pdf = image_page(&image, 842.0, 595.0, &placement);

        assert!(pdf.starts_with(b"%PDF-"));
        let text = String::from_utf8_lossy(&pdf);
        assert!(text.trim_end().ends_with("%%EOF"));
        assert!(text.contains("/MediaBox [0 0 842 595]"));
        assert!(text.contains("/FlateDecode"));
        assert!(text.contains("/DeviceRGB"));
        assert!(text.contains("/Im0 4 0 R"));

        let samples = decompress_to_vec_zlib(stream_after(&pdf, b"/Subtype /Image")).unwrap();
        assert_eq!(samples, image.data);
    }

    #[test]
    fn test_export_pdf_centered() {
        let plan = RoomPlan::new(RoomShape::Straight, 10).unwrap();
        let render = RenderSettings::default();
        let scene = layout_plan(&plan, &render);
        let settings = ExportSettings {
            load_system_fonts: false,
            ..ExportSettings::default()
        };
        let pdf = export_pdf(&scene, &render, &settings).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));

        // Pieces span 504 x 40, padded by 20 on each side: 544 x 80.
        let text = String::from_utf8_lossy(&pdf);
        assert!(text.contains("/Width 544"));
        assert!(text.contains("/Height 80"));
        let samples = decompress_to_vec_zlib(stream_after(&pdf, b"/Subtype /Image")).unwrap();
        assert_eq!(samples.len(), 544 * 80 * 3);

        // Width-bound: drawn across the full page at x = 0.
        let content = String::from_utf8_lossy(stream_after(&pdf, b"5 0 obj"));
        assert!(content.contains("842 0 0 "), "{content}");
        assert!(content.contains("/Im0 Do"), "{content}");
    }

    #[test]
    fn test_empty_scene() {
        let scene = Scene::empty(mejlis_core::Point::default(), 30.0);
        let result = export_pdf(&scene, &RenderSettings::default(), &ExportSettings::default());
        assert!(matches!(result, Err(ExportError::EmptyScene)));
    }
}
