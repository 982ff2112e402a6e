//! # Request Validation
//!
//! Turns a [`RawEstimateRequest`] into an [`EstimateRequest`], stopping at
//! the first field that breaks a rule. Fields are checked in a fixed order:
//! dimensions, floors, walls/roof presence, walls, roof, foundation, gates,
//! windows, doors.
//!
//! Table keys (panel thicknesses, slab thicknesses, opening sizes) are
//! checked against the [`PriceBook`] the estimator was built with, so a
//! request that validates can always be priced.

use crate::errors::{EstimateError, EstimateResult};
use crate::prices::{list_keys, PriceBook};
use crate::request::{
    Dimensions, EstimateRequest, Floors, Foundation, NumberInput, Openings, RawEstimateRequest,
    RawFoundation, RawOpenings, RawPanel, RawSection, Roof, WallKind, Walls,
};
use crate::units::Meters;

/// Validate and normalize a raw request.
pub fn validate_request(raw: &RawEstimateRequest, prices: &PriceBook) -> EstimateResult<EstimateRequest> {
    let dimensions = Dimensions {
        length: Meters(positive("length", raw.length.as_ref())?),
        width: Meters(positive("width", raw.width.as_ref())?),
        height: Meters(positive("height", raw.height.as_ref())?),
    };
    let floors = floors(raw.floors.as_ref())?;

    let raw_walls = section("walls", raw.walls.as_ref())?
        .ok_or_else(|| EstimateError::missing_field("walls"))?;
    let raw_roof = section("roof", raw.roof.as_ref())?
        .ok_or_else(|| EstimateError::missing_field("roof"))?;

    let walls = walls(raw_walls, prices)?;
    let roof = roof(raw_roof, prices)?;
    let foundation = foundation(section("foundation", raw.foundation.as_ref())?, floors, prices)?;
    let gates = openings("gates", section("gates", raw.gates.as_ref())?, |size| {
        prices.gate_price(size).is_some()
    })
    .map_err(|e| with_keys(e, "gates.size", prices.gates.iter().map(|g| g.size.as_str())))?;
    let windows = openings("windows", section("windows", raw.windows.as_ref())?, |size| {
        prices.window_price(size).is_some()
    })
    .map_err(|e| with_keys(e, "windows.size", prices.windows.iter().map(|w| w.size.as_str())))?;
    let doors = count("doors", raw.doors.as_ref())?;

    Ok(EstimateRequest {
        dimensions,
        floors,
        has_project: raw.has_project,
        foundation,
        walls,
        roof,
        gates,
        windows,
        doors,
    })
}

// ============================================================================
// Field rules
// ============================================================================

/// A nested object, if present. Non-object values are rejected.
fn section<'a, T>(field: &str, input: Option<&'a RawSection<T>>) -> EstimateResult<Option<&'a T>> {
    match input {
        None => Ok(None),
        Some(RawSection::Object(object)) => Ok(Some(object)),
        Some(RawSection::Other(value)) => Err(EstimateError::invalid_input(
            field,
            value.to_string(),
            "Must be an object",
        )),
    }
}

fn number(field: &str, input: Option<&NumberInput>) -> EstimateResult<f64> {
    let input = input.ok_or_else(|| EstimateError::missing_field(field))?;
    input
        .coerce()
        .ok_or_else(|| EstimateError::invalid_input(field, input.to_string(), "Must be a number"))
}

fn positive(field: &str, input: Option<&NumberInput>) -> EstimateResult<f64> {
    let value = number(field, input)?;
    if value <= 0.0 {
        return Err(EstimateError::invalid_input(
            field,
            value.to_string(),
            "Must be greater than zero",
        ));
    }
    Ok(value)
}

fn whole(field: &str, value: f64, reason: &str) -> EstimateResult<u32> {
    if value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(EstimateError::invalid_input(field, value.to_string(), reason));
    }
    Ok(value as u32)
}

/// Optional non-negative whole count; absent means zero.
fn count(field: &str, input: Option<&NumberInput>) -> EstimateResult<u32> {
    match input {
        None => Ok(0),
        Some(_) => {
            let value = number(field, input)?;
            if value < 0.0 {
                return Err(EstimateError::invalid_input(
                    field,
                    value.to_string(),
                    "Count cannot be negative",
                ));
            }
            whole(field, value, "Count must be a whole number")
        }
    }
}

fn floors(input: Option<&NumberInput>) -> EstimateResult<Floors> {
    let value = number("floors", input)?;
    if value == 1.0 {
        Ok(Floors::One)
    } else if value == 2.0 {
        Ok(Floors::Two)
    } else {
        Err(EstimateError::invalid_input(
            "floors",
            value.to_string(),
            "Floor count must be 1 or 2",
        ))
    }
}

fn thickness_mm(field: &str, input: Option<&NumberInput>, accepted: Vec<u32>) -> EstimateResult<u32> {
    let value = number(field, input)?;
    let reason = format!("Thickness must be one of: {} mm", list_keys(&accepted));
    let mm = whole(field, value, &reason)?;
    if !accepted.contains(&mm) {
        return Err(EstimateError::invalid_input(field, value.to_string(), reason));
    }
    Ok(mm)
}

fn walls(raw: &RawPanel, prices: &PriceBook) -> EstimateResult<Walls> {
    let name = raw.kind.as_ref().ok_or_else(|| EstimateError::missing_field("walls.type"))?;
    let kind = name.as_text().and_then(WallKind::from_wire).ok_or_else(|| {
        EstimateError::invalid_input(
            "walls.type",
            name.to_string(),
            "Wall type must be 'sandwich' or 'pir'",
        )
    })?;
    let thickness_mm = thickness_mm(
        "walls.thickness",
        raw.thickness.as_ref(),
        prices.wall_thicknesses(kind),
    )?;
    Ok(Walls { kind, thickness_mm })
}

fn roof(raw: &RawPanel, prices: &PriceBook) -> EstimateResult<Roof> {
    let name = raw.kind.as_ref().ok_or_else(|| EstimateError::missing_field("roof.type"))?;
    match name.as_text() {
        Some("sandwich") => {
            let thickness_mm =
                thickness_mm("roof.thickness", raw.thickness.as_ref(), prices.roof_thicknesses())?;
            Ok(Roof::Sandwich { thickness_mm })
        }
        Some("membrane") => Ok(Roof::Membrane),
        _ => Err(EstimateError::invalid_input(
            "roof.type",
            name.to_string(),
            "Roof type must be 'sandwich' or 'membrane'",
        )),
    }
}

fn slab_thickness(input: Option<&NumberInput>, prices: &PriceBook) -> EstimateResult<f64> {
    let value = number("foundation.thickness", input)?;
    if !prices.is_slab_thickness(value) {
        return Err(EstimateError::invalid_input(
            "foundation.thickness",
            value.to_string(),
            format!(
                "Slab thickness must be one of: {} m",
                list_keys(&prices.foundation.slab_thicknesses_m)
            ),
        ));
    }
    Ok(value)
}

fn foundation(raw: Option<&RawFoundation>, floors: Floors, prices: &PriceBook) -> EstimateResult<Foundation> {
    let Some(raw) = raw else {
        return Ok(Foundation::None);
    };
    let Some(name) = raw.kind.as_ref() else {
        return Ok(Foundation::None);
    };
    match name.as_text() {
        Some("none") => Ok(Foundation::None),
        Some("slab") => Ok(Foundation::Slab {
            thickness_m: slab_thickness(raw.thickness.as_ref(), prices)?,
        }),
        Some("strip") => {
            let slab_thickness_m = match floors {
                Floors::One => None,
                Floors::Two => Some(slab_thickness(raw.thickness.as_ref(), prices)?),
            };
            Ok(Foundation::Strip { slab_thickness_m })
        }
        _ => Err(EstimateError::invalid_input(
            "foundation.type",
            name.to_string(),
            "Foundation type must be 'none', 'slab' or 'strip'",
        )),
    }
}

fn openings(
    group: &str,
    raw: Option<&RawOpenings>,
    is_known_size: impl Fn(&str) -> bool,
) -> EstimateResult<Option<Openings>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let count = count(&format!("{}.count", group), raw.count.as_ref())?;
    if count == 0 {
        return Ok(None);
    }

    let size_field = format!("{}.size", group);
    let input = raw
        .size
        .as_ref()
        .ok_or_else(|| EstimateError::missing_field(&size_field))?;
    let size = input
        .as_text()
        .filter(|size| is_known_size(size))
        .ok_or_else(|| EstimateError::invalid_input(&size_field, input.to_string(), "Unknown size"))?;
    Ok(Some(Openings {
        count,
        size: size.to_string(),
    }))
}

/// Append the accepted sizes to an "Unknown size" fault for `field`.
fn with_keys<'a>(err: EstimateError, field: &str, keys: impl Iterator<Item = &'a str>) -> EstimateError {
    match err {
        EstimateError::InvalidInput {
            field: f,
            value,
            reason,
        } if f == field => EstimateError::InvalidInput {
            field: f,
            value,
            reason: format!("{}; expected one of: {}", reason, list_keys(keys)),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RawFoundation;

    fn base() -> RawEstimateRequest {
        RawEstimateRequest {
            length: Some(10.0.into()),
            width: Some(8.0.into()),
            height: Some(6.0.into()),
            floors: Some(1.0.into()),
            has_project: true,
            foundation: None,
            walls: Some(RawSection::Object(RawPanel {
                kind: Some("sandwich".into()),
                thickness: Some(100.0.into()),
            })),
            roof: Some(RawSection::Object(RawPanel {
                kind: Some("membrane".into()),
                thickness: None,
            })),
            gates: None,
            windows: None,
            doors: None,
        }
    }

    fn field_of(raw: &RawEstimateRequest) -> String {
        validate_request(raw, &PriceBook::standard())
            .unwrap_err()
            .field()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_valid_request_normalizes() {
        let mut raw = base();
        raw.width = Some("8".into());
        raw.doors = Some("2".into());
        let req = validate_request(&raw, &PriceBook::standard()).unwrap();
        assert_eq!(req.dimensions.width, Meters(8.0));
        assert_eq!(req.floors, Floors::One);
        assert_eq!(req.foundation, Foundation::None);
        assert_eq!(req.walls, Walls { kind: WallKind::Sandwich, thickness_mm: 100 });
        assert_eq!(req.roof, Roof::Membrane);
        assert_eq!(req.gates, None);
        assert_eq!(req.doors, 2);
    }

    #[test]
    fn test_dimensions_must_be_positive_numbers() {
        let mut raw = base();
        raw.length = None;
        assert!(matches!(
            validate_request(&raw, &PriceBook::standard()),
            Err(EstimateError::MissingField { .. })
        ));

        raw.length = Some(0.0.into());
        assert_eq!(field_of(&raw), "length");

        raw.length = Some(10.0.into());
        raw.height = Some("tall".into());
        assert_eq!(field_of(&raw), "height");

        raw.height = Some((-6.0).into());
        assert_eq!(field_of(&raw), "height");
    }

    #[test]
    fn test_floors_must_be_one_or_two() {
        let mut raw = base();
        for bad in [0.0, 3.0, 1.5, -1.0] {
            raw.floors = Some(bad.into());
            assert_eq!(field_of(&raw), "floors");
        }
        raw.floors = Some("2".into());
        let req = validate_request(&raw, &PriceBook::standard()).unwrap();
        assert_eq!(req.floors, Floors::Two);
    }

    #[test]
    fn test_first_error_wins() {
        let mut raw = base();
        raw.floors = Some(3.0.into());
        raw.walls = None;
        raw.doors = Some((-1.0).into());
        assert_eq!(field_of(&raw), "floors");
    }

    #[test]
    fn test_walls_and_roof_required() {
        let mut raw = base();
        raw.walls = None;
        assert_eq!(field_of(&raw), "walls");

        let mut raw = base();
        raw.roof = None;
        assert_eq!(field_of(&raw), "roof");
    }

    #[test]
    fn test_wall_thickness_must_match_type() {
        let mut raw = base();
        raw.walls = Some(RawSection::Object(RawPanel {
            kind: Some("sandwich".into()),
            thickness: Some(99.0.into()),
        }));
        assert_eq!(field_of(&raw), "walls.thickness");

        raw.walls = Some(RawSection::Object(RawPanel {
            kind: Some("pir".into()),
            thickness: Some(200.0.into()),
        }));
        let err = validate_request(&raw, &PriceBook::standard()).unwrap_err();
        assert_eq!(err.field(), Some("walls.thickness"));
        assert!(err.to_string().contains("60, 100, 150"));

        raw.walls = Some(RawSection::Object(RawPanel {
            kind: Some("pir".into()),
            thickness: Some("60".into()),
        }));
        assert!(validate_request(&raw, &PriceBook::standard()).is_ok());
    }

    #[test]
    fn test_wall_type_enum() {
        let mut raw = base();
        raw.walls = Some(RawSection::Object(RawPanel {
            kind: Some("brick".into()),
            thickness: Some(100.0.into()),
        }));
        assert_eq!(field_of(&raw), "walls.type");
    }

    #[test]
    fn test_roof_thickness_only_for_sandwich() {
        let mut raw = base();
        raw.roof = Some(RawSection::Object(RawPanel {
            kind: Some("membrane".into()),
            thickness: Some(999.0.into()),
        }));
        assert!(validate_request(&raw, &PriceBook::standard()).is_ok());

        raw.roof = Some(RawSection::Object(RawPanel {
            kind: Some("sandwich".into()),
            thickness: Some(120.0.into()),
        }));
        assert_eq!(field_of(&raw), "roof.thickness");

        raw.roof = Some(RawSection::Object(RawPanel {
            kind: Some("sandwich".into()),
            thickness: None,
        }));
        assert_eq!(field_of(&raw), "roof.thickness");

        raw.roof = Some(RawSection::Object(RawPanel {
            kind: Some("tiles".into()),
            thickness: None,
        }));
        assert_eq!(field_of(&raw), "roof.type");
    }

    #[test]
    fn test_foundation_rules() {
        let mut raw = base();
        raw.foundation = Some(RawSection::Object(RawFoundation {
            kind: Some("slab".into()),
            thickness: Some(0.25.into()),
        }));
        assert_eq!(field_of(&raw), "foundation.thickness");

        raw.foundation = Some(RawSection::Object(RawFoundation {
            kind: Some("slab".into()),
            thickness: Some("0.3".into()),
        }));
        let req = validate_request(&raw, &PriceBook::standard()).unwrap();
        assert_eq!(req.foundation, Foundation::Slab { thickness_m: 0.3 });

        raw.foundation = Some(RawSection::Object(RawFoundation {
            kind: Some("pile".into()),
            thickness: None,
        }));
        assert_eq!(field_of(&raw), "foundation.type");
    }

    #[test]
    fn test_strip_needs_slab_thickness_only_for_two_floors() {
        let mut raw = base();
        raw.foundation = Some(RawSection::Object(RawFoundation {
            kind: Some("strip".into()),
            thickness: None,
        }));
        let req = validate_request(&raw, &PriceBook::standard()).unwrap();
        assert_eq!(req.foundation, Foundation::Strip { slab_thickness_m: None });

        raw.floors = Some(2.0.into());
        assert_eq!(field_of(&raw), "foundation.thickness");

        raw.foundation = Some(RawSection::Object(RawFoundation {
            kind: Some("strip".into()),
            thickness: Some(0.2.into()),
        }));
        let req = validate_request(&raw, &PriceBook::standard()).unwrap();
        assert_eq!(req.foundation, Foundation::Strip { slab_thickness_m: Some(0.2) });
    }

    #[test]
    fn test_opening_rules() {
        let mut raw = base();
        raw.gates = Some(RawSection::Object(RawOpenings {
            count: Some(2.0.into()),
            size: None,
        }));
        assert_eq!(field_of(&raw), "gates.size");

        raw.gates = Some(RawSection::Object(RawOpenings {
            count: Some((-1.0).into()),
            size: Some("3x3".into()),
        }));
        assert_eq!(field_of(&raw), "gates.count");

        raw.gates = Some(RawSection::Object(RawOpenings {
            count: Some(0.0.into()),
            size: Some("bogus".into()),
        }));
        let req = validate_request(&raw, &PriceBook::standard()).unwrap();
        assert_eq!(req.gates, None);

        raw.windows = Some(RawSection::Object(RawOpenings {
            count: Some(3.0.into()),
            size: Some("2x2".into()),
        }));
        let err = validate_request(&raw, &PriceBook::standard()).unwrap_err();
        assert_eq!(err.field(), Some("windows.size"));
        assert!(err.to_string().contains("1.2x2"));
    }

    #[test]
    fn test_wrong_json_types_name_their_field() {
        let body = |json: &str| serde_json::from_str::<RawEstimateRequest>(json).unwrap();
        let mut raw = base();

        raw.walls = body(r#"{ "walls": { "type": 5, "thickness": 100 } }"#).walls;
        let err = validate_request(&raw, &PriceBook::standard()).unwrap_err();
        assert_eq!(err.field(), Some("walls.type"));
        assert!(err.to_string().contains(": 5 -"));

        raw.walls = body(r#"{ "walls": "sandwich" }"#).walls;
        assert_eq!(field_of(&raw), "walls");

        let mut raw = base();
        raw.roof = body(r#"{ "roof": { "type": null } }"#).roof;
        assert!(matches!(
            validate_request(&raw, &PriceBook::standard()),
            Err(EstimateError::MissingField { .. })
        ));

        let mut raw = base();
        raw.length = body(r#"{ "length": [10] }"#).length;
        assert_eq!(field_of(&raw), "length");

        let mut raw = base();
        raw.foundation = body(r#"{ "foundation": { "type": false } }"#).foundation;
        assert_eq!(field_of(&raw), "foundation.type");

        let mut raw = base();
        raw.gates = body(r#"{ "gates": { "count": 1, "size": 3 } }"#).gates;
        assert_eq!(field_of(&raw), "gates.size");

        let mut raw = base();
        raw.windows = body(r#"{ "windows": 2 }"#).windows;
        assert_eq!(field_of(&raw), "windows");
    }

    #[test]
    fn test_doors_must_be_non_negative_count() {
        let mut raw = base();
        raw.doors = Some((-1.0).into());
        assert_eq!(field_of(&raw), "doors");
        raw.doors = Some("many".into());
        assert_eq!(field_of(&raw), "doors");
        raw.doors = Some(1.5.into());
        assert_eq!(field_of(&raw), "doors");
    }
}
