//! Export jobs: synchronous rendering per format, and an async session
//! that runs exports off the caller's task and cancels them when it goes
//! away.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use mejlis_renderer::{render_svg, RenderSettings, Scene};

use crate::error::ExportError;
use crate::pdf::export_pdf;
use crate::raster::export_png;
use crate::settings::ExportSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Svg,
    Png,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Configured download name for this format.
    pub fn default_file_name<'a>(&self, settings: &'a ExportSettings) -> &'a str {
        match self {
            ExportFormat::Svg => &settings.svg_file_name,
            ExportFormat::Png => &settings.png_file_name,
            ExportFormat::Pdf => &settings.pdf_file_name,
        }
    }

    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()?.to_str()?.parse().ok()
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "svg" => Ok(ExportFormat::Svg),
            "png" => Ok(ExportFormat::Png),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(format!("unknown export format '{other}'")),
        }
    }
}

/// Produce the file contents for one format.
pub fn render_export(
    format: ExportFormat,
    scene: &Scene,
    render: &RenderSettings,
    settings: &ExportSettings,
) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Svg => {
            if scene.is_empty() {
                return Err(ExportError::EmptyScene);
            }
            Ok(render_svg(scene, render).into_bytes())
        }
        ExportFormat::Png => export_png(scene, render, settings),
        ExportFormat::Pdf => export_pdf(scene, render, settings),
    }
}

/// Render and write one export, blocking the current thread.
pub fn write_export(
    format: ExportFormat,
    scene: &Scene,
    render: &RenderSettings,
    settings: &ExportSettings,
    path: &Path,
) -> Result<(), ExportError> {
    let bytes = render_export(format, scene, render, settings)
        .inspect_err(|e| log::error!("{format} export failed: {e}"))?;
    std::fs::write(path, &bytes)?;
    log::info!("Exported {format} ({} bytes) to {}", bytes.len(), path.display());
    Ok(())
}

// ── Async session ────────────────────────────────────────────────────

/// Owns the cancellation signal for the exports it spawns. Dropping the
/// session (or calling [`ExportSession::cancel`]) cancels every job that
/// has not written its file yet.
pub struct ExportSession {
    cancel: watch::Sender<bool>,
    render: RenderSettings,
    settings: ExportSettings,
}

impl ExportSession {
    pub fn new(render: RenderSettings, settings: ExportSettings) -> Self {
        let (cancel, _) = watch::channel(false);
        Self {
            cancel,
            render,
            settings,
        }
    }

    pub fn cancel(&self) {
        if !self.cancel.send_replace(true) {
            log::info!("Export session cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Start an export on the runtime. Must be called from within a Tokio
    /// runtime.
    pub fn spawn(&self, format: ExportFormat, scene: Scene, path: PathBuf) -> ExportJob {
        let id = Uuid::new_v4();
        let cancelled = self.cancel.subscribe();
        let render = self.render.clone();
        let settings = self.settings.clone();
        log::info!("Export job {id}: {format} to {}", path.display());

        let handle = tokio::spawn(run_job(format, scene, path, render, settings, cancelled));

        ExportJob { id, format, handle }
    }
}

async fn run_job(
    format: ExportFormat,
    scene: Scene,
    path: PathBuf,
    render: RenderSettings,
    settings: ExportSettings,
    mut cancelled: watch::Receiver<bool>,
) -> Result<PathBuf, ExportError> {
    if *cancelled.borrow() {
        return Err(ExportError::Cancelled);
    }

    let work =
        tokio::task::spawn_blocking(move || render_export(format, &scene, &render, &settings));
    let bytes = tokio::select! {
        joined = work => joined??,
        _ = cancelled.wait_for(|c| *c) => return Err(ExportError::Cancelled),
    };

    // The render may finish in the same instant the session is dropped.
    if *cancelled.borrow() {
        return Err(ExportError::Cancelled);
    }
    tokio::fs::write(&path, &bytes).await?;
    Ok(path)
}

impl Drop for ExportSession {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Handle to a spawned export.
pub struct ExportJob {
    id: Uuid,
    format: ExportFormat,
    handle: JoinHandle<Result<PathBuf, ExportError>>,
}

impl ExportJob {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the job and report its outcome.
    pub async fn wait(self) -> Result<PathBuf, ExportError> {
        let result = match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(ExportError::Join(e)),
        };
        match &result {
            Ok(path) => log::info!("Export job {} wrote {}", self.id, path.display()),
            Err(ExportError::Cancelled) => log::info!("Export job {} cancelled", self.id),
            Err(e) => log::error!("Export job {} failed: {e}", self.id),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mejlis_core::{Point, RoomPlan, RoomShape};
    use mejlis_renderer::layout_plan;

    fn scene() -> Scene {
        let plan = RoomPlan::new(RoomShape::U, 14).unwrap();
        layout_plan(&plan, &RenderSettings::default())
    }

    fn session() -> ExportSession {
        ExportSession::new(
            RenderSettings::default(),
            ExportSettings {
                load_system_fonts: false,
                ..ExportSettings::default()
            },
        )
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("PNG".parse::<ExportFormat>().unwrap(), ExportFormat::Png);
        assert!("gif".parse::<ExportFormat>().is_err());
        assert_eq!(
            ExportFormat::from_path(Path::new("out/room.pdf")),
            Some(ExportFormat::Pdf)
        );
        assert_eq!(ExportFormat::from_path(Path::new("room")), None);
        let settings = ExportSettings::default();
        assert_eq!(ExportFormat::Png.default_file_name(&settings), "room-shape.png");
    }

    #[test]
    fn test_write_export_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.svg");
        write_export(
            ExportFormat::Svg,
            &scene(),
            &RenderSettings::default(),
            &ExportSettings::default(),
            &path,
        )
        .unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.starts_with("<svg"));
    }

    #[test]
    fn test_empty_scene_is_rejected() {
        let empty = Scene::empty(Point::default(), 30.0);
        for format in [ExportFormat::Svg, ExportFormat::Png, ExportFormat::Pdf] {
            let result = render_export(
                format,
                &empty,
                &RenderSettings::default(),
                &ExportSettings::default(),
            );
            assert!(matches!(result, Err(ExportError::EmptyScene)));
        }
    }

    #[tokio::test]
    async fn test_spawned_exports_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let session = session();

        let png = session.spawn(ExportFormat::Png, scene(), dir.path().join("a.png"));
        let pdf = session.spawn(ExportFormat::Pdf, scene(), dir.path().join("a.pdf"));
        assert_ne!(png.id(), pdf.id());

        let png_path = png.wait().await.unwrap();
        let pdf_path = pdf.wait().await.unwrap();
        assert!(std::fs::read(png_path).unwrap().starts_with(b"\x89PNG"));
        assert!(std::fs::read(pdf_path).unwrap().starts_with(b"%PDF-"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_spawned_export_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("a.svg");
        let session = session();

        let job = session.spawn(ExportFormat::Svg, scene(), path.clone());
        assert!(matches!(job.wait().await, Err(ExportError::Io(_))));
        assert!(!path.exists());

        let ok = session.spawn(ExportFormat::Svg, scene(), dir.path().join("a.svg"));
        let written = ok.wait().await.unwrap();
        assert!(std::fs::read_to_string(written).unwrap().starts_with("<svg"));
    }

    #[tokio::test]
    async fn test_cancel_before_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never.png");
        let session = session();
        session.cancel();
        assert!(session.is_cancelled());

        let job = session.spawn(ExportFormat::Png, scene(), path.clone());
        assert!(matches!(job.wait().await, Err(ExportError::Cancelled)));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_dropping_session_cancels_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dropped.pdf");
        let job = {
            let session = session();
            session.spawn(ExportFormat::Pdf, scene(), path.clone())
        };
        // The current-thread test runtime has not polled the job yet.
        assert!(matches!(job.wait().await, Err(ExportError::Cancelled)));
        assert!(!path.exists());
    }
}
