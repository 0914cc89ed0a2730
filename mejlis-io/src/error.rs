use std::io;
use thiserror::Error;

use mejlis_core::PlanError;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("SVG parse error: {0}")]
    SvgParse(#[from] resvg::usvg::Error),

    #[error("Cannot allocate a {width}x{height} pixmap")]
    Pixmap { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    PngEncode(String),

    #[error("Export cancelled")]
    Cancelled,

    #[error("Export task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Nothing to export: the scene has no pieces")]
    EmptyScene,

    #[error("Invalid plan: {0}")]
    Plan(#[from] PlanError),
}
