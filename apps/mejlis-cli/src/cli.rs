use std::path::PathBuf;

use clap::{Parser, Subcommand};

use mejlis_core::RoomShape;

/// Plan, check and export Mejlis seating layouts.
#[derive(Parser, Debug)]
#[command(name = "mejlis", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build or edit a plan, report its sides and warnings, and export it.
    Plan(PlanArgs),

    /// Find the drawn piece under a point of the rendered plan.
    Pick(PickArgs),

    /// Convert between the order form and the backend order payload.
    #[command(subcommand)]
    Order(OrderCommand),
}

// ── Shared argument structs ──────────────────────────────────────────

/// Where the plan comes from.
#[derive(clap::Args, Debug)]
pub struct PlanSource {
    /// Plan document to start from.
    #[arg(long)]
    pub document: Option<PathBuf>,

    /// Room shape: L, U or Straight.
    #[arg(long)]
    pub shape: Option<RoomShape>,

    /// Total room size in meters.
    #[arg(long)]
    pub size: Option<u32>,

    /// Drawing scale in pixels per meter.
    #[arg(long)]
    pub scale: Option<f64>,
}

// ── plan ─────────────────────────────────────────────────────────────

#[derive(clap::Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub source: PlanSource,

    /// Re-derive the sides evenly from shape and size.
    #[arg(long)]
    pub reset: bool,

    /// Override a side length, e.g. `--side 1=6`. Repeatable.
    #[arg(long = "side", value_name = "N=LEN")]
    pub sides: Vec<String>,

    /// Replace a side's segments, e.g. `--segments side1=3,2`. The list may
    /// not exceed the side length. Repeatable.
    #[arg(long = "segments", value_name = "SIDE=A,B,..")]
    pub segments: Vec<String>,

    /// Change one segment, e.g. `--set-segment side1:0=2` sets the first
    /// segment of side 1 to 2m. Repeatable.
    #[arg(long = "set-segment", value_name = "SIDE:I=LEN")]
    pub set_segments: Vec<String>,

    /// Remove one segment by 0-based position, e.g. `--remove-segment side1:1`.
    /// Repeatable.
    #[arg(long = "remove-segment", value_name = "SIDE:I")]
    pub remove_segments: Vec<String>,

    /// Append a segment to a side, e.g. `--add-segment side2`. Repeatable.
    #[arg(long = "add-segment", value_name = "SIDE")]
    pub add_segments: Vec<String>,

    #[arg(long)]
    pub svg: Option<PathBuf>,

    #[arg(long)]
    pub png: Option<PathBuf>,

    #[arg(long)]
    pub pdf: Option<PathBuf>,

    /// Write all three formats into this directory using the configured
    /// file names.
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Save the resulting plan document.
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Name stored in a newly created document.
    #[arg(long, default_value = "Untitled room")]
    pub name: String,
}

// ── pick ─────────────────────────────────────────────────────────────

#[derive(clap::Args, Debug)]
pub struct PickArgs {
    #[command(flatten)]
    pub source: PlanSource,

    /// X coordinate in drawing pixels.
    #[arg(long)]
    pub x: f64,

    /// Y coordinate in drawing pixels.
    #[arg(long)]
    pub y: f64,
}

// ── order ────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum OrderCommand {
    /// Read an order form JSON file and print the order payload.
    ToPayload {
        form: PathBuf,
    },

    /// Read an order payload JSON file and print the editable form.
    FromPayload {
        payload: PathBuf,
    },
}
