use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

use mejlis_check::{blocks_submission, check_plan, Violation};
use mejlis_core::commands::{
    AddSegmentCommand, ChangeSegmentCommand, ChangeSideLengthCommand, RemoveSegmentCommand,
    ResetSidesCommand, SetRoomSizeCommand, SetShapeCommand,
};
use mejlis_core::side::{is_valid_segment_length, segment_sum};
use mejlis_core::{
    OrderForm, OrderPayload, PlanError, Point, RoomPlan, RoomShape, SideKey, SideSummary,
};
use mejlis_io::{ExportFormat, ExportSession, PlanDocument};
use mejlis_renderer::{layout_plan, SceneIndex};

use crate::cli::{OrderCommand, PickArgs, PlanArgs, PlanSource};

// ── Plan loading ─────────────────────────────────────────────────────

/// Load or create the document, then apply shape/size/scale overrides.
fn open_plan(source: &PlanSource, name: &str) -> Result<(PlanDocument, RoomPlan), String> {
    let (mut doc, mut plan) = match &source.document {
        Some(path) => {
            let doc = PlanDocument::load(path).map_err(|e| e.to_string())?;
            let plan = doc.to_plan().map_err(|e| e.to_string())?;
            (doc, plan)
        }
        None => {
            let shape = source.shape.unwrap_or_default();
            let size = source.size.unwrap_or(12);
            let plan = RoomPlan::new(shape, size).map_err(|e| e.to_string())?;
            (PlanDocument::new(name, &plan), plan)
        }
    };

    if source.document.is_some() {
        if let Some(shape) = source.shape {
            plan.execute(Box::new(SetShapeCommand::new(shape)))
                .map_err(|e| e.to_string())?;
        }
        if let Some(size) = source.size {
            plan.execute(Box::new(SetRoomSizeCommand::new(size)))
                .map_err(|e| e.to_string())?;
        }
    }

    if let Some(scale) = source.scale {
        doc.render.scale = scale;
    }
    Ok((doc, plan))
}

/// Parse `N=LEN` (1-based side number).
fn parse_side_override(raw: &str) -> Result<(usize, u32), String> {
    let (side, length) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected N=LEN, got '{raw}'"))?;
    let number: usize = side
        .trim()
        .trim_start_matches("side")
        .parse()
        .map_err(|_| format!("invalid side number in '{raw}'"))?;
    if number == 0 {
        return Err(format!("side numbers start at 1: '{raw}'"));
    }
    let length = length
        .trim()
        .parse()
        .map_err(|_| format!("invalid length in '{raw}'"))?;
    Ok((number - 1, length))
}

/// Parse `side1=3,2` into a key and its segment values (each 1-3).
fn parse_segments_override(raw: &str) -> Result<(SideKey, Vec<u32>), String> {
    let (side, values) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected SIDE=A,B,.., got '{raw}'"))?;
    let key: SideKey = side.trim().parse().map_err(|e: PlanError| e.to_string())?;
    let values = values
        .split(',')
        .map(|v| v.trim().parse::<u32>().map_err(|_| format!("invalid segment '{v}' in '{raw}'")))
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(bad) = values.iter().find(|&&v| !is_valid_segment_length(v)) {
        return Err(format!("segment {bad}m on {key} is outside the 1-3m range"));
    }
    Ok((key, values))
}

/// Parse `side1:0` into a key and a 0-based segment position.
fn parse_segment_ref(raw: &str) -> Result<(SideKey, usize), String> {
    let (side, index) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected SIDE:I, got '{raw}'"))?;
    let key: SideKey = side.trim().parse().map_err(|e: PlanError| e.to_string())?;
    let index = index
        .trim()
        .parse()
        .map_err(|_| format!("invalid segment position in '{raw}'"))?;
    Ok((key, index))
}

/// Parse `side1:0=2` into a segment reference and its new length.
fn parse_segment_edit(raw: &str) -> Result<(SideKey, usize, u32), String> {
    let (target, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected SIDE:I=LEN, got '{raw}'"))?;
    let (key, index) = parse_segment_ref(target)?;
    let value = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid length in '{raw}'"))?;
    Ok((key, index, value))
}

// ── plan ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct PlanReport {
    shape: RoomShape,
    room_size: u32,
    available_length: u32,
    sides_total: u32,
    sides: Vec<SideSummary>,
    violations: Vec<Violation>,
    ready_to_submit: bool,
    exported: Vec<PathBuf>,
}

pub async fn plan(args: PlanArgs) -> Result<Value, String> {
    let (mut doc, mut plan) = open_plan(&args.source, &args.name)?;

    // Segment lists are stored data: replace them and rebuild the plan.
    if !args.segments.is_empty() {
        doc.update_plan(&plan);
        for raw in &args.segments {
            let (key, values) = parse_segments_override(raw)?;
            let length = plan
                .side_length(key)
                .ok_or_else(|| format!("{key} does not exist on a {} plan", plan.shape()))?;
            let sum = segment_sum(&values);
            if sum > length {
                return Err(PlanError::SideOverflow { side: key, sum, length }.to_string());
            }
            doc.segments.insert(key, values);
        }
        plan = doc.to_plan().map_err(|e| e.to_string())?;
    }

    if args.reset {
        plan.execute(Box::new(ResetSidesCommand::new()))
            .map_err(|e| e.to_string())?;
    }
    for raw in &args.sides {
        let (index, length) = parse_side_override(raw)?;
        plan.execute(Box::new(ChangeSideLengthCommand::new(index, length)))
            .map_err(|e| e.to_string())?;
    }
    for raw in &args.set_segments {
        let (key, index, value) = parse_segment_edit(raw)?;
        plan.execute(Box::new(ChangeSegmentCommand::new(key, index, value)))
            .map_err(|e| e.to_string())?;
    }
    for raw in &args.remove_segments {
        let (key, index) = parse_segment_ref(raw)?;
        plan.execute(Box::new(RemoveSegmentCommand::new(key, index)))
            .map_err(|e| e.to_string())?;
    }
    for raw in &args.add_segments {
        let key: SideKey = raw.trim().parse().map_err(|e: PlanError| e.to_string())?;
        plan.execute(Box::new(AddSegmentCommand::new(key)))
            .map_err(|e| e.to_string())?;
    }

    let violations = check_plan(&plan);
    let scene = layout_plan(&plan, &doc.render);

    let mut targets: Vec<(ExportFormat, PathBuf)> = Vec::new();
    if let Some(path) = args.svg {
        targets.push((ExportFormat::Svg, path));
    }
    if let Some(path) = args.png {
        targets.push((ExportFormat::Png, path));
    }
    if let Some(path) = args.pdf {
        targets.push((ExportFormat::Pdf, path));
    }
    if let Some(dir) = &args.out_dir {
        std::fs::create_dir_all(dir).map_err(|e| format!("Failed to create {}: {e}", dir.display()))?;
        for format in [ExportFormat::Svg, ExportFormat::Png, ExportFormat::Pdf] {
            targets.push((format, dir.join(format.default_file_name(&doc.export))));
        }
    }

    let mut exported = Vec::new();
    if !targets.is_empty() {
        let session = ExportSession::new(doc.render.clone(), doc.export.clone());
        let jobs: Vec<_> = targets
            .into_iter()
            .map(|(format, path)| session.spawn(format, scene.clone(), path))
            .collect();
        for job in jobs {
            exported.push(job.wait().await.map_err(|e| e.to_string())?);
        }
    }

    if let Some(path) = &args.save {
        doc.update_plan(&plan);
        doc.save(path).map_err(|e| e.to_string())?;
    }

    let report = PlanReport {
        shape: plan.shape(),
        room_size: plan.room_size(),
        available_length: plan.available_length(),
        sides_total: plan.sides_total(),
        sides: plan.summary(),
        ready_to_submit: !blocks_submission(&violations),
        violations,
        exported,
    };
    serde_json::to_value(&report).map_err(|e| e.to_string())
}

// ── pick ─────────────────────────────────────────────────────────────

pub fn pick(args: PickArgs) -> Result<Value, String> {
    let (doc, plan) = open_plan(&args.source, "Untitled room")?;
    let scene = layout_plan(&plan, &doc.render);
    let index = SceneIndex::build(&scene);
    let piece = index.pick(&scene, &Point::new(args.x, args.y));
    serde_json::to_value(piece).map_err(|e| e.to_string())
}

// ── order ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct FormReport {
    form: OrderForm,
    ready_to_submit: bool,
}

pub fn order(command: OrderCommand) -> Result<Value, String> {
    match command {
        OrderCommand::ToPayload { form } => {
            let json = std::fs::read_to_string(&form)
                .map_err(|e| format!("Failed to read {}: {e}", form.display()))?;
            let form: OrderForm = serde_json::from_str(&json).map_err(|e| e.to_string())?;
            let form = form.priced();
            if !form.ready_to_submit() {
                return Err("Segments must add up to each side length before submitting".to_string());
            }
            let payload = OrderPayload::from_form(&form);
            serde_json::to_value(&payload).map_err(|e| e.to_string())
        }
        OrderCommand::FromPayload { payload } => {
            let json = std::fs::read_to_string(&payload)
                .map_err(|e| format!("Failed to read {}: {e}", payload.display()))?;
            let payload = OrderPayload::from_json(&json).map_err(|e| e.to_string())?;
            let form = OrderForm::from_payload(&payload).priced();
            let report = FormReport {
                ready_to_submit: form.ready_to_submit(),
                form,
            };
            serde_json::to_value(&report).map_err(|e| e.to_string())
        }
    }
}
