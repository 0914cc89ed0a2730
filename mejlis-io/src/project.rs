use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mejlis_core::{RoomPlan, RoomShape, Segments};
use mejlis_renderer::RenderSettings;

use crate::error::ExportError;
use crate::settings::ExportSettings;

/// A saved room plan together with its drawing and export settings
/// (`.mejlis.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    pub id: Uuid,
    pub name: String,
    pub version: String,
    pub shape: RoomShape,
    pub room_size: u32,
    pub sides: Vec<u32>,
    pub segments: Segments,
    #[serde(default)]
    pub render: RenderSettings,
    #[serde(default)]
    pub export: ExportSettings,
}

impl PlanDocument {
    pub fn new(name: &str, plan: &RoomPlan) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            shape: plan.shape(),
            room_size: plan.room_size(),
            sides: plan.sides().to_vec(),
            segments: plan.segments().clone(),
            render: RenderSettings::default(),
            export: ExportSettings::default(),
        }
    }

    /// Rebuild the plan exactly as stored; sides are not re-derived.
    pub fn to_plan(&self) -> Result<RoomPlan, ExportError> {
        Ok(RoomPlan::from_parts(
            self.shape,
            self.room_size,
            self.sides.clone(),
            self.segments.clone(),
        )?)
    }

    /// Store the plan's current state, keeping id, name and settings.
    pub fn update_plan(&mut self, plan: &RoomPlan) {
        self.shape = plan.shape();
        self.room_size = plan.room_size();
        self.sides = plan.sides().to_vec();
        self.segments = plan.segments().clone();
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ExportError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ExportError> {
        let json = std::fs::read_to_string(path)?;
        let doc = Self::from_json(&json)?;
        log::info!("Loaded plan '{}' from {}", doc.name, path.display());
        Ok(doc)
    }

    pub fn save(&self, path: &Path) -> Result<(), ExportError> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved plan '{}' to {}", self.name, path.display());
        Ok(())
    }
}
