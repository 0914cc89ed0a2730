//! # Mejlis Renderer
//!
//! Turns a room plan into a floor-plan scene: one rectangle per segment and
//! corner block, laid out by walking the sides with a turning cursor. The
//! scene can be serialized to SVG for preview and export, and indexed for
//! hit testing.

pub mod layout;
pub mod palette;
pub mod placement;
pub mod scene;
pub mod settings;
pub mod spatial;
pub mod svg;

pub use layout::{layout, layout_plan};
pub use palette::Color;
pub use placement::Placement;
pub use scene::{Direction, PieceKind, Scene, ScenePiece};
pub use settings::RenderSettings;
pub use spatial::SceneIndex;
pub use svg::{render_svg, render_svg_with_view};
