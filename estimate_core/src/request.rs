//! # Estimate Requests
//!
//! Two shapes of the same request:
//!
//! - [`RawEstimateRequest`] mirrors the JSON body a client sends. Every field
//!   is optional, numbers may arrive as strings, and a value of the wrong JSON
//!   type is kept as-is, so deserialization of an object never decides
//!   whether a request is valid.
//! - [`EstimateRequest`] is what the validator produces: fully typed, every
//!   table key already checked against the price book. Pricing only ever
//!   reads this form.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "length": 10, "width": 8, "height": 6,
//!   "floors": 1,
//!   "hasProject": true,
//!   "foundation": { "type": "slab", "thickness": 0.2 },
//!   "walls": { "type": "sandwich", "thickness": 100 },
//!   "roof": { "type": "membrane" },
//!   "gates": { "count": 1, "size": "3x4" },
//!   "windows": { "count": 0 },
//!   "doors": 1
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::units::Meters;

// ============================================================================
// Raw (wire) request
// ============================================================================

/// A number as it arrives on the wire: a JSON number, a string, or any
/// other JSON value (which never coerces).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    Number(f64),
    Text(String),
    Other(Value),
}

impl NumberInput {
    /// Coerce to a finite number. Blank or non-numeric text yields `None`.
    pub fn coerce(&self) -> Option<f64> {
        let value = match self {
            NumberInput::Number(n) => *n,
            NumberInput::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok()?
            }
            NumberInput::Other(_) => return None,
        };
        value.is_finite().then_some(value)
    }
}

impl fmt::Display for NumberInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberInput::Number(n) => write!(f, "{}", n),
            NumberInput::Text(s) => write!(f, "\"{}\"", s),
            NumberInput::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<f64> for NumberInput {
    fn from(n: f64) -> Self {
        NumberInput::Number(n)
    }
}

impl From<&str> for NumberInput {
    fn from(s: &str) -> Self {
        NumberInput::Text(s.to_string())
    }
}

/// An enum name or table key as it arrives on the wire. Non-string values
/// are kept so the validator can report them against their field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextInput {
    Text(String),
    Other(Value),
}

impl TextInput {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TextInput::Text(s) => Some(s),
            TextInput::Other(_) => None,
        }
    }
}

impl fmt::Display for TextInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextInput::Text(s) => write!(f, "{}", s),
            TextInput::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for TextInput {
    fn from(s: &str) -> Self {
        TextInput::Text(s.to_string())
    }
}

/// A nested object of the request (`walls`, `gates`, ...). Anything that is
/// not an object is kept as raw JSON and rejected by the validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSection<T> {
    Object(T),
    Other(Value),
}

impl<T> From<T> for RawSection<T> {
    fn from(object: T) -> Self {
        RawSection::Object(object)
    }
}

/// `hasProject` follows truthiness: `false`, `null`, `0` and `""`
/// are false, everything else is true.
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|x| x != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

/// Foundation selection as sent by the client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFoundation {
    #[serde(rename = "type")]
    pub kind: Option<TextInput>,
    pub thickness: Option<NumberInput>,
}

/// Wall or roof panel selection as sent by the client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPanel {
    #[serde(rename = "type")]
    pub kind: Option<TextInput>,
    pub thickness: Option<NumberInput>,
}

/// Gates or windows as sent by the client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOpenings {
    pub count: Option<NumberInput>,
    pub size: Option<TextInput>,
}

/// Unvalidated request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEstimateRequest {
    pub length: Option<NumberInput>,
    pub width: Option<NumberInput>,
    pub height: Option<NumberInput>,
    pub floors: Option<NumberInput>,
    #[serde(default, deserialize_with = "truthy")]
    pub has_project: bool,
    pub foundation: Option<RawSection<RawFoundation>>,
    pub walls: Option<RawSection<RawPanel>>,
    pub roof: Option<RawSection<RawPanel>>,
    pub gates: Option<RawSection<RawOpenings>>,
    pub windows: Option<RawSection<RawOpenings>>,
    pub doors: Option<NumberInput>,
}

// ============================================================================
// Validated request
// ============================================================================

/// Building footprint and wall height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: Meters,
    pub width: Meters,
    pub height: Meters,
}

/// Supported floor counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Floors {
    One,
    Two,
}

impl Floors {
    pub fn count(self) -> u8 {
        match self {
            Floors::One => 1,
            Floors::Two => 2,
        }
    }
}

/// Foundation choice with the thickness it needs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Foundation {
    None,
    /// Monolithic raft slab
    Slab { thickness_m: f64 },
    /// Perimeter strip footing. Two-floor buildings also get a slab whose
    /// thickness is carried here.
    Strip { slab_thickness_m: Option<f64> },
}

/// Wall panel type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallKind {
    Sandwich,
    Pir,
}

impl WallKind {
    /// Parse the wire name (`"sandwich"`, `"pir"`)
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "sandwich" => Some(WallKind::Sandwich),
            "pir" => Some(WallKind::Pir),
            _ => None,
        }
    }

    /// Name shown on the estimate
    pub fn display_name(self) -> &'static str {
        match self {
            WallKind::Sandwich => "Сэндвич",
            WallKind::Pir => "ПИР",
        }
    }
}

/// Wall panel selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Walls {
    pub kind: WallKind,
    pub thickness_mm: u32,
}

/// Roof covering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Roof {
    Sandwich { thickness_mm: u32 },
    Membrane,
}

/// A non-empty group of identical gates or windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Openings {
    pub count: u32,
    pub size: String,
}

/// Fully validated request. Only the validator constructs these from
/// client input; tests may build them directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub dimensions: Dimensions,
    pub floors: Floors,
    pub has_project: bool,
    pub foundation: Foundation,
    pub walls: Walls,
    pub roof: Roof,
    /// `None` when no gates were requested
    pub gates: Option<Openings>,
    /// `None` when no windows were requested
    pub windows: Option<Openings>,
    pub doors: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_coercion() {
        assert_eq!(NumberInput::Number(10.0).coerce(), Some(10.0));
        assert_eq!(NumberInput::from(" 8.5 ").coerce(), Some(8.5));
        assert_eq!(NumberInput::from("").coerce(), None);
        assert_eq!(NumberInput::from("ten").coerce(), None);
        assert_eq!(NumberInput::from("NaN").coerce(), None);
        assert_eq!(NumberInput::from("inf").coerce(), None);
    }

    #[test]
    fn test_raw_request_from_json() {
        let json = r#"{
            "length": 10, "width": "8", "height": 6,
            "floors": 1, "hasProject": true,
            "walls": { "type": "sandwich", "thickness": 100 },
            "roof": { "type": "membrane" },
            "gates": { "count": 0 }
        }"#;
        let raw: RawEstimateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(raw.length, Some(NumberInput::Number(10.0)));
        assert_eq!(raw.width, Some(NumberInput::Text("8".to_string())));
        assert!(raw.has_project);
        assert!(raw.foundation.is_none());
        let Some(RawSection::Object(walls)) = &raw.walls else {
            panic!("walls should be an object");
        };
        assert_eq!(walls.kind, Some(TextInput::from("sandwich")));
        assert!(matches!(&raw.roof, Some(RawSection::Object(roof)) if roof.thickness.is_none()));
        assert!(raw.windows.is_none());
        assert!(raw.doors.is_none());
    }

    #[test]
    fn test_wrong_json_types_are_kept() {
        let json = r#"{
            "length": true,
            "walls": { "type": 5, "thickness": [100] },
            "roof": "membrane",
            "gates": { "count": 1, "size": { "w": 3 } }
        }"#;
        let raw: RawEstimateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(raw.length, Some(NumberInput::Other(Value::Bool(true))));
        assert_eq!(raw.length.as_ref().unwrap().coerce(), None);
        let Some(RawSection::Object(walls)) = &raw.walls else {
            panic!("walls should be an object");
        };
        assert_eq!(walls.kind.as_ref().unwrap().as_text(), None);
        assert_eq!(walls.kind.as_ref().unwrap().to_string(), "5");
        assert_eq!(raw.roof, Some(RawSection::Other(Value::from("membrane"))));
        let Some(RawSection::Object(gates)) = &raw.gates else {
            panic!("gates should be an object");
        };
        assert_eq!(gates.size.as_ref().unwrap().to_string(), r#"{"w":3}"#);
    }

    #[test]
    fn test_has_project_truthiness() {
        let flag = |v: &str| {
            serde_json::from_str::<RawEstimateRequest>(&format!(r#"{{"hasProject": {}}}"#, v))
                .unwrap()
                .has_project
        };
        assert!(flag("true"));
        assert!(flag("1"));
        assert!(flag("\"yes\""));
        assert!(!flag("false"));
        assert!(!flag("0"));
        assert!(!flag("\"\""));
        assert!(!flag("null"));
    }

    #[test]
    fn test_has_project_defaults_to_false() {
        let raw: RawEstimateRequest = serde_json::from_str("{}").unwrap();
        assert!(!raw.has_project);
    }

    #[test]
    fn test_wall_kind_wire_names() {
        assert_eq!(WallKind::from_wire("pir"), Some(WallKind::Pir));
        assert_eq!(WallKind::from_wire("Sandwich"), None);
        assert_eq!(WallKind::Pir.display_name(), "ПИР");
    }

    #[test]
    fn test_floor_count() {
        assert_eq!(Floors::One.count(), 1);
        assert_eq!(Floors::Two.count(), 2);
    }
}
