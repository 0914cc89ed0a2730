//! # Mejlis I/O
//!
//! Export of rendered room plans to SVG, PNG and single-page PDF, with an
//! async export session whose jobs are cancelled when it is dropped. Also
//! handles the JSON plan document that stores a plan with its settings.

pub mod error;
pub mod export;
pub mod pdf;
pub mod project;
pub mod raster;
pub mod settings;

pub use error::ExportError;
pub use export::{render_export, write_export, ExportFormat, ExportJob, ExportSession};
pub use pdf::export_pdf;
pub use project::PlanDocument;
pub use raster::{encode_png, export_png, rasterize, RgbImage};
pub use settings::ExportSettings;
