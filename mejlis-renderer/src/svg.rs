//! Standalone SVG output for a laid-out scene.

use mejlis_core::BBox;

use crate::scene::Scene;
use crate::settings::RenderSettings;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Render the scene framed by its margin-padded view box.
pub fn render_svg(scene: &Scene, settings: &RenderSettings) -> String {
    render_svg_with_view(scene, settings, &scene.view_box())
}

/// Render the scene framed by an explicit view box (scene coordinates).
/// The document's pixel size equals the view box size.
pub fn render_svg_with_view(scene: &Scene, settings: &RenderSettings, view: &BBox) -> String {
    let mut out = String::new();
    let width = view.width();
    let height = view.height();

    out.push_str(&format!(
        "<svg xmlns=\"{SVG_NS}\" viewBox=\"{} {} {} {}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"xMidYMid meet\">\n",
        num(view.min.x),
        num(view.min.y),
        num(width),
        num(height),
        num(width),
        num(height),
    ));

    for piece in &scene.pieces {
        let r = &piece.rect;
        let center = r.center();
        out.push_str(&format!(
            concat!(
                "  <g><rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\" rx=\"{}\"/>",
                "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-family=\"sans-serif\" font-size=\"{}\" font-weight=\"bold\" fill=\"{}\">{}</text></g>\n",
            ),
            num(r.origin.x),
            num(r.origin.y),
            num(r.width),
            num(r.height),
            piece.fill,
            settings.stroke_color,
            num(settings.stroke_width),
            num(settings.corner_radius),
            num(center.x),
            num(center.y + settings.font_size / 3.0),
            num(settings.font_size),
            settings.label_color,
            escape(&piece.label),
        ));
    }

    out.push_str("</svg>\n");
    out
}

/// Compact number formatting: integers without a trailing `.0`, other
/// values rounded to 3 decimals.
fn num(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let s = format!("{value:.3}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
