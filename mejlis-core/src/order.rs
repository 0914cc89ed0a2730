//! Mapping between the flat order form and the nested order payload the
//! backend accepts. Only the wire shape lives here; transport is elsewhere.

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::plan::RoomPlan;
use crate::shape::RoomShape;
use crate::side::{segment_sum, SideKey, Segments};

fn default_material_type() -> String {
    "Mejlis".to_string()
}

/// Flat order form as filled in by the user across the form steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderForm {
    #[serde(rename = "customerName")]
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub order_code: String,
    pub receive_order_at: String,
    pub completed_order_at: Option<String>,
    pub material_type: String,
    pub material_made_from: String,
    pub design_type: String,
    pub no_of_mekeda: u32,
    pub no_of_pillow: u32,
    pub uplift_or_height: f64,
    pub room_size: u32,
    pub room_shape: RoomShape,
    pub price_per_meter: f64,
    pub total_price: f64,
    /// Advance payment.
    pub app_front: f64,
    pub remaining_payment: f64,
    pub has_table: bool,
    pub segments: Segments,
    pub sides: Vec<u32>,
}

impl Default for OrderForm {
    fn default() -> Self {
        Self {
            customer_name: String::new(),
            phone: String::new(),
            address: String::new(),
            order_code: String::new(),
            receive_order_at: String::new(),
            completed_order_at: None,
            material_type: default_material_type(),
            material_made_from: String::new(),
            design_type: String::new(),
            no_of_mekeda: 0,
            no_of_pillow: 0,
            uplift_or_height: 0.0,
            room_size: 12,
            room_shape: RoomShape::L,
            price_per_meter: 0.0,
            total_price: 0.0,
            app_front: 0.0,
            remaining_payment: 0.0,
            has_table: false,
            segments: Segments::new(),
            sides: Vec::new(),
        }
    }
}

impl OrderForm {
    /// Copy the room configuration out of an edited plan.
    pub fn with_plan(mut self, plan: &RoomPlan) -> Self {
        self.room_shape = plan.shape();
        self.room_size = plan.room_size();
        self.sides = plan.sides().to_vec();
        self.segments = plan.segments().clone();
        self
    }

    /// Derive totals: `price_per_meter * room_size` and the balance left
    /// after the advance payment.
    pub fn priced(mut self) -> Self {
        self.total_price = self.price_per_meter * f64::from(self.room_size);
        self.remaining_payment = self.total_price - self.app_front;
        self
    }

    /// Rebuild the plan stored in this form without re-deriving sides.
    pub fn plan(&self) -> Result<RoomPlan, PlanError> {
        RoomPlan::from_parts(
            self.room_shape,
            self.room_size,
            self.sides.clone(),
            self.segments.clone(),
        )
    }

    /// Submission is only allowed once every side's segments add up.
    pub fn ready_to_submit(&self) -> bool {
        match self.plan() {
            Ok(plan) => !plan.sides().is_empty() && plan.segments_are_valid(),
            Err(e) => {
                log::debug!("Order form has no usable plan: {e}");
                false
            }
        }
    }

    /// Reverse of [`OrderPayload::from_form`]. Sides are recomputed as the
    /// sum of each side's segments.
    pub fn from_payload(payload: &OrderPayload) -> Self {
        let material = payload.mejlis_materials.first().cloned().unwrap_or_default();

        let segments: Segments = material
            .segments
            .iter()
            .map(|s| (s.side_name, s.values.clone()))
            .collect();
        let sides = segments.values().map(|v| segment_sum(v)).collect();

        Self {
            customer_name: payload.customer.name.clone(),
            phone: payload.customer.phone.clone(),
            address: payload.customer.address.clone(),
            order_code: payload.order_code.clone(),
            receive_order_at: payload.receive_order_at.clone(),
            completed_order_at: payload.completed_order_at.clone(),
            material_type: material.material_type,
            material_made_from: material.material_made_from,
            design_type: material.design_type,
            no_of_mekeda: material.no_of_mekeda,
            no_of_pillow: material.no_of_pillow,
            uplift_or_height: material.uplift_or_height,
            room_size: material.room_size,
            room_shape: material.room_shape,
            price_per_meter: material.price_per_meter,
            total_price: payload.total_price,
            app_front: payload.app_front,
            remaining_payment: payload.remaining_payment,
            has_table: material.has_table,
            segments,
            sides,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Customer {
    pub name: String,
    pub phone: String,
    pub address: String,
}

/// One side's segments in the payload's list form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideSegments {
    pub side_name: SideKey,
    pub values: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MejlisMaterial {
    pub material_type: String,
    pub material_made_from: String,
    pub design_type: String,
    #[serde(deserialize_with = "lenient::u32")]
    pub no_of_mekeda: u32,
    #[serde(deserialize_with = "lenient::u32")]
    pub no_of_pillow: u32,
    #[serde(deserialize_with = "lenient::f64")]
    pub uplift_or_height: f64,
    #[serde(deserialize_with = "lenient::u32")]
    pub room_size: u32,
    pub room_shape: RoomShape,
    #[serde(deserialize_with = "lenient::f64")]
    pub price_per_meter: f64,
    pub has_table: bool,
    pub segments: Vec<SideSegments>,
}

impl Default for MejlisMaterial {
    fn default() -> Self {
        Self {
            material_type: default_material_type(),
            material_made_from: String::new(),
            design_type: String::new(),
            no_of_mekeda: 0,
            no_of_pillow: 0,
            uplift_or_height: 0.0,
            room_size: 0,
            room_shape: RoomShape::L,
            price_per_meter: 0.0,
            has_table: false,
            segments: Vec::new(),
        }
    }
}

/// Order create/update body as the backend expects it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderPayload {
    pub order_code: String,
    pub receive_order_at: String,
    pub completed_order_at: Option<String>,
    #[serde(deserialize_with = "lenient::f64")]
    pub total_price: f64,
    #[serde(deserialize_with = "lenient::f64")]
    pub app_front: f64,
    #[serde(deserialize_with = "lenient::f64")]
    pub remaining_payment: f64,
    pub customer: Customer,
    pub mejlis_materials: Vec<MejlisMaterial>,
}

impl OrderPayload {
    pub fn from_form(form: &OrderForm) -> Self {
        let segments = form
            .segments
            .iter()
            .map(|(side, values)| SideSegments {
                side_name: *side,
                values: values.clone(),
            })
            .collect();

        Self {
            order_code: form.order_code.clone(),
            receive_order_at: form.receive_order_at.clone(),
            completed_order_at: form
                .completed_order_at
                .clone()
                .filter(|date| !date.is_empty()),
            total_price: form.total_price,
            app_front: form.app_front,
            remaining_payment: form.remaining_payment,
            customer: Customer {
                name: form.customer_name.clone(),
                phone: form.phone.clone(),
                address: form.address.clone(),
            },
            mejlis_materials: vec![MejlisMaterial {
                material_type: form.material_type.clone(),
                material_made_from: form.material_made_from.clone(),
                design_type: form.design_type.clone(),
                no_of_mekeda: form.no_of_mekeda,
                no_of_pillow: form.no_of_pillow,
                uplift_or_height: form.uplift_or_height,
                room_size: form.room_size,
                room_shape: form.room_shape,
                price_per_meter: form.price_per_meter,
                has_table: form.has_table,
                segments,
            }],
        }
    }

    pub fn to_json(&self) -> Result<String, PlanError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PlanError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Numeric fields may arrive as JSON numbers, decimal strings or null.
/// Anything unparseable reads as zero.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn as_f64(value: &Value) -> f64 {
        match value {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            Value::String(s) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    pub fn f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let n = as_f64(&value);
        Ok(if n.is_finite() { n } else { 0.0 })
    }

    pub fn u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let n = as_f64(&value);
        Ok(if n.is_finite() && n > 0.0 {
            n.min(f64::from(u32::MAX)) as u32
        } else {
            0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_form() -> OrderForm {
        let plan = RoomPlan::new(RoomShape::L, 12).unwrap();
        OrderForm {
            customer_name: "Amina".into(),
            phone: "0911".into(),
            address: "Bole".into(),
            order_code: "ORD-7".into(),
            receive_order_at: "2026-10-01".into(),
            completed_order_at: Some(String::new()),
            design_type: "classic".into(),
            material_made_from: "velvet".into(),
            no_of_mekeda: 4,
            price_per_meter: 150.0,
            app_front: 500.0,
            ..OrderForm::default()
        }
        .with_plan(&plan)
    }

    #[test]
    fn test_pricing() {
        let form = sample_form().priced();
        assert!((form.total_price - 1800.0).abs() < 1e-9);
        assert!((form.remaining_payment - 1300.0).abs() < 1e-9);
    }

    #[test]
    fn test_payload_shape() {
        let payload = OrderPayload::from_form(&sample_form().priced());
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["customer"]["name"], "Amina");
        assert!(value["completed_order_at"].is_null());
        let material = &value["mejlis_materials"][0];
        assert_eq!(material["room_shape"], "L");
        assert_eq!(material["segments"][0]["side_name"], "side1");
        assert_eq!(material["segments"][1]["values"], serde_json::json!([2, 3]));
    }

    #[test]
    fn test_form_from_payload_rebuilds_sides() {
        let payload = OrderPayload::from_form(&sample_form().priced());
        let form = OrderForm::from_payload(&payload);
        assert_eq!(form.sides, vec![5, 5]);
        assert_eq!(form.customer_name, "Amina");
        assert_eq!(form.completed_order_at, None);
        assert!(form.ready_to_submit());
    }

    #[test]
    fn test_lenient_numbers() {
        let json = r#"{
            "order_code": "X1",
            "total_price": "1800.00",
            "app_front": null,
            "mejlis_materials": [{
                "room_size": "12",
                "room_shape": "U",
                "price_per_meter": 150,
                "segments": [{"side_name": "side1", "values": [3, 3]}]
            }]
        }"#;
        let payload = OrderPayload::from_json(json).unwrap();
        assert!((payload.total_price - 1800.0).abs() < 1e-9);
        assert!(payload.app_front.abs() < 1e-9);

        let form = OrderForm::from_payload(&payload);
        assert_eq!(form.room_size, 12);
        assert_eq!(form.room_shape, RoomShape::U);
        assert_eq!(form.material_type, "Mejlis");
        assert_eq!(form.sides, vec![6]);
    }

    #[test]
    fn test_missing_material_defaults() {
        let form = OrderForm::from_payload(&OrderPayload::default());
        assert_eq!(form.room_shape, RoomShape::L);
        assert_eq!(form.material_type, "Mejlis");
        assert!(!form.ready_to_submit());
    }

    #[test]
    fn test_invalid_segments_block_submission() {
        let mut plan = RoomPlan::new(RoomShape::L, 12).unwrap();
        plan.remove_segment(SideKey::new(1), 1).unwrap();
        let form = OrderForm::default().with_plan(&plan);
        assert!(!form.ready_to_submit());
    }
}
