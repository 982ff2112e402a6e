//! # Pricing
//!
//! Computes the raw (pre-markup) cost of every applicable construction
//! category, in canonical order. Nothing is rounded here; rounding belongs
//! to [`crate::reconcile`].
//!
//! | Code | Category | Present when |
//! |------|----------|--------------|
//! | 01 | Project documentation | `!has_project` |
//! | 02 | Foundation | foundation is not `none` |
//! | 03 | Metal structure | always |
//! | 04 | Walls | always |
//! | 05 | Roof | always |
//! | 06 | Gates | gate count > 0 |
//! | 07 | Windows | window count > 0 |
//! | 08 | Doors | door count > 0 |
//!
//! Codes belong to the category, not to the row position: doors are "08"
//! even when gates and windows are absent.

use serde::{Deserialize, Serialize};

use crate::errors::{EstimateError, EstimateResult};
use crate::format::{format_quantity, ru_plural};
use crate::prices::PriceBook;
use crate::request::{EstimateRequest, Floors, Foundation, Openings, Roof};
use crate::units::{CubicMeters, Kilograms, Meters, SquareMeters, Tons};

/// Construction categories in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Project,
    Foundation,
    MetalStructure,
    Walls,
    Roof,
    Gates,
    Windows,
    Doors,
}

impl Category {
    /// All categories for iteration, in output order
    pub const ALL: [Category; 8] = [
        Category::Project,
        Category::Foundation,
        Category::MetalStructure,
        Category::Walls,
        Category::Roof,
        Category::Gates,
        Category::Windows,
        Category::Doors,
    ];

    /// Fixed two-digit row code
    pub fn code(self) -> &'static str {
        match self {
            Category::Project => "01",
            Category::Foundation => "02",
            Category::MetalStructure => "03",
            Category::Walls => "04",
            Category::Roof => "05",
            Category::Gates => "06",
            Category::Windows => "07",
            Category::Doors => "08",
        }
    }

    /// Row title shown on the estimate
    pub fn title(self) -> &'static str {
        match self {
            Category::Project => "Проектирование",
            Category::Foundation => "Фундамент",
            Category::MetalStructure => "Металлоконструкции",
            Category::Walls => "Стеновые панели",
            Category::Roof => "Кровля",
            Category::Gates => "Ворота",
            Category::Windows => "Окна",
            Category::Doors => "Двери",
        }
    }
}

/// One category's cost before markup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLineItem {
    pub category: Category,
    pub subtitle: String,
    pub volume: String,
    pub raw_price: f64,
}

/// Priced rows plus their raw subtotal
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PricedItems {
    pub items: Vec<RawLineItem>,
    pub subtotal: f64,
}

impl PricedItems {
    fn push(&mut self, item: RawLineItem) {
        self.subtotal += item.raw_price;
        self.items.push(item);
    }

    /// Raw cost of a category, if it was priced
    pub fn raw_price(&self, category: Category) -> Option<f64> {
        self.items
            .iter()
            .find(|i| i.category == category)
            .map(|i| i.raw_price)
    }
}

/// Quantities and cost of one monolithic slab
#[derive(Debug, Clone, Copy, PartialEq)]
struct Slab {
    concrete: CubicMeters,
    cost: f64,
}

/// Prices a validated request against one price book.
pub struct Pricer<'a> {
    prices: &'a PriceBook,
}

impl<'a> Pricer<'a> {
    pub fn new(prices: &'a PriceBook) -> Self {
        Pricer { prices }
    }

    /// Price every applicable category in canonical order.
    pub fn price(&self, request: &EstimateRequest) -> EstimateResult<PricedItems> {
        let mut priced = PricedItems::default();

        if !request.has_project {
            priced.push(self.project());
        }
        if let Some(item) = self.foundation(request) {
            priced.push(item);
        }
        priced.push(self.metal_structure(request));
        priced.push(self.walls(request)?);
        priced.push(self.roof(request)?);
        if let Some(gates) = &request.gates {
            priced.push(self.gates(gates)?);
        }
        if let Some(windows) = &request.windows {
            priced.push(self.windows(windows)?);
        }
        if request.doors > 0 {
            priced.push(self.doors(request.doors));
        }

        Ok(priced)
    }

    fn project(&self) -> RawLineItem {
        let sections = self.prices.project.sections;
        RawLineItem {
            category: Category::Project,
            subtitle: "Разделы АР, КМ, КМД".to_string(),
            volume: format!(
                "{} {}",
                sections,
                ru_plural(sections as u64, "раздел", "раздела", "разделов")
            ),
            raw_price: self.prices.project.fee,
        }
    }

    /// Slab under the whole footprint with an installation margin.
    fn slab(&self, request: &EstimateRequest, thickness_m: f64) -> Slab {
        let f = &self.prices.foundation;
        let d = request.dimensions;
        let area = (d.length * d.width).scaled(f.slab_area_margin);
        let concrete = area * Meters(thickness_m);
        let rebar = Kilograms(area.0 * f.slab_rebar_kg_per_m2);
        let cost = concrete.0 * (f.concrete_per_m3 + f.labor_per_m3 + f.equipment_per_m3)
            + rebar.0 * f.rebar_per_kg;
        Slab { concrete, cost }
    }

    fn foundation(&self, request: &EstimateRequest) -> Option<RawLineItem> {
        let f = &self.prices.foundation;
        let d = request.dimensions;

        match request.foundation {
            Foundation::None => None,
            Foundation::Slab { thickness_m } => {
                let slab = self.slab(request, thickness_m);
                let levels = match request.floors {
                    Floors::One => 1.0,
                    Floors::Two => 2.0,
                };
                let mut subtitle = format!("Монолитная плита {} мм", format_quantity(thickness_m * 1000.0, 0));
                if request.floors == Floors::Two {
                    subtitle.push_str(" × 2");
                }
                Some(RawLineItem {
                    category: Category::Foundation,
                    subtitle,
                    volume: format!("{} м³", format_quantity(slab.concrete.0 * levels, 2)),
                    raw_price: slab.cost * levels,
                })
            }
            Foundation::Strip { slab_thickness_m } => {
                let perimeter = (d.length + d.width).scaled(2.0);
                let concrete = CubicMeters(perimeter.0 * f.strip_m3_per_m);
                let rebar = Kilograms(perimeter.0 * f.strip_rebar_kg_per_m);
                let mut cost = perimeter.0 * f.strip_labor_per_m
                    + concrete.0 * (f.concrete_per_m3 + f.equipment_per_m3)
                    + rebar.0 * f.rebar_per_kg;
                let mut subtitle = "Ленточный".to_string();
                let mut volume = format!("{} м.п.", format_quantity(perimeter.0, 1));

                // Two floors: the strip carries the ground floor, a slab caps it.
                if let (Floors::Two, Some(thickness_m)) = (request.floors, slab_thickness_m) {
                    let slab = self.slab(request, thickness_m);
                    cost += slab.cost;
                    subtitle.push_str(&format!(
                        " + плита {} мм",
                        format_quantity(thickness_m * 1000.0, 0)
                    ));
                    volume.push_str(&format!(" / {} м³", format_quantity(slab.concrete.0, 2)));
                }

                Some(RawLineItem {
                    category: Category::Foundation,
                    subtitle,
                    volume,
                    raw_price: cost,
                })
            }
        }
    }

    fn metal_structure(&self, request: &EstimateRequest) -> RawLineItem {
        let m = &self.prices.metal;
        let d = request.dimensions;
        let footprint: SquareMeters = d.length * d.width;
        let tonnage = Tons(footprint.0 * self.prices.metal_tons_per_m2(request.floors));
        RawLineItem {
            category: Category::MetalStructure,
            subtitle: "Каркас: изготовление и монтаж".to_string(),
            volume: format!("{} т", format_quantity(tonnage.0, 2)),
            raw_price: tonnage.0 * (m.material_per_ton + m.fabrication_per_ton),
        }
    }

    fn walls(&self, request: &EstimateRequest) -> EstimateResult<RawLineItem> {
        let w = &self.prices.walls;
        let d = request.dimensions;
        let walls = request.walls;
        let area: SquareMeters = (d.length + d.width) * d.height.scaled(2.0);
        let panel = self
            .prices
            .wall_panel_price(walls.kind, walls.thickness_mm)
            .ok_or_else(|| {
                EstimateError::invalid_input(
                    "walls.thickness",
                    walls.thickness_mm.to_string(),
                    "No panel price for this wall type and thickness",
                )
            })?;
        Ok(RawLineItem {
            category: Category::Walls,
            subtitle: format!("{} {} мм", walls.kind.display_name(), walls.thickness_mm),
            volume: format!("{} м²", format_quantity(area.0, 1)),
            raw_price: area.0 * (w.labor_per_m2 + panel) * w.multiplier,
        })
    }

    fn roof(&self, request: &EstimateRequest) -> EstimateResult<RawLineItem> {
        let r = &self.prices.roof;
        let d = request.dimensions;
        let area = (d.length * d.width).scaled(r.area_margin);
        let (material, subtitle) = match request.roof {
            Roof::Sandwich { thickness_mm } => {
                let price = self.prices.roof_panel_price(thickness_mm).ok_or_else(|| {
                    EstimateError::invalid_input(
                        "roof.thickness",
                        thickness_mm.to_string(),
                        "No panel price for this roof thickness",
                    )
                })?;
                (price, format!("Сэндвич-панели {} мм", thickness_mm))
            }
            Roof::Membrane => (r.membrane_per_m2, "Мембранная".to_string()),
        };
        Ok(RawLineItem {
            category: Category::Roof,
            subtitle,
            volume: format!("{} м²", format_quantity(area.0, 1)),
            raw_price: area.0 * (r.labor_per_m2 + material),
        })
    }

    fn gates(&self, gates: &Openings) -> EstimateResult<RawLineItem> {
        let unit = self
            .prices
            .gate_price(&gates.size)
            .ok_or_else(|| EstimateError::invalid_input("gates.size", gates.size.as_str(), "Unknown size"))?;
        Ok(RawLineItem {
            category: Category::Gates,
            subtitle: format!("Подъёмные {} м", gates.size),
            volume: format!("{} шт", gates.count),
            raw_price: unit * gates.count as f64,
        })
    }

    fn windows(&self, windows: &Openings) -> EstimateResult<RawLineItem> {
        let unit = self
            .prices
            .window_price(&windows.size)
            .ok_or_else(|| EstimateError::invalid_input("windows.size", windows.size.as_str(), "Unknown size"))?;
        Ok(RawLineItem {
            category: Category::Windows,
            subtitle: format!("Металлопластиковые {} м", windows.size),
            volume: format!("{} шт", windows.count),
            raw_price: unit * windows.count as f64,
        })
    }

    fn doors(&self, count: u32) -> RawLineItem {
        RawLineItem {
            category: Category::Doors,
            subtitle: "Входные металлические 900×2100 мм".to_string(),
            volume: format!("{} шт", count),
            raw_price: self.prices.door_unit * count as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{Dimensions, WallKind, Walls};

    fn request() -> EstimateRequest {
        EstimateRequest {
            dimensions: Dimensions {
                length: Meters(10.0),
                width: Meters(8.0),
                height: Meters(6.0),
            },
            floors: Floors::One,
            has_project: true,
            foundation: Foundation::None,
            walls: Walls {
                kind: WallKind::Sandwich,
                thickness_mm: 100,
            },
            roof: Roof::Membrane,
            gates: None,
            windows: None,
            doors: 0,
        }
    }

    fn price(req: &EstimateRequest) -> PricedItems {
        Pricer::new(&PriceBook::standard()).price(req).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_minimal_building() {
        let priced = price(&request());
        let categories: Vec<Category> = priced.items.iter().map(|i| i.category).collect();
        assert_eq!(
            categories,
            vec![Category::MetalStructure, Category::Walls, Category::Roof]
        );
        assert!(close(priced.raw_price(Category::Walls).unwrap(), 1_166_724.0));
        assert!(close(priced.raw_price(Category::MetalStructure).unwrap(), 621_600.0));
        assert!(close(priced.raw_price(Category::Roof).unwrap(), 182_400.0));
        assert!(close(priced.subtotal, 1_970_724.0));
    }

    #[test]
    fn test_labels() {
        let priced = price(&request());
        let walls = &priced.items[1];
        assert_eq!(walls.subtitle, "Сэндвич 100 мм");
        assert_eq!(walls.volume, "216 м²");
        assert_eq!(priced.items[0].volume, "3.36 т");
        assert_eq!(priced.items[2].subtitle, "Мембранная");
        assert_eq!(priced.items[2].volume, "96 м²");
    }

    #[test]
    fn test_project_row() {
        let mut req = request();
        req.has_project = false;
        let priced = price(&req);
        let first = &priced.items[0];
        assert_eq!(first.category, Category::Project);
        assert_eq!(first.volume, "3 раздела");
        assert!(close(first.raw_price, 300_000.0));
    }

    #[test]
    fn test_slab_foundation() {
        let mut req = request();
        req.foundation = Foundation::Slab { thickness_m: 0.2 };
        let single = price(&req);
        // area 88 m², concrete 17.6 m³ × 13 500 + 88 × 25 kg × 90
        let expected = 17.6 * 13_500.0 + 88.0 * 25.0 * 90.0;
        assert!(close(single.raw_price(Category::Foundation).unwrap(), expected));
        assert_eq!(single.items[0].volume, "17.6 м³");
        assert_eq!(single.items[0].subtitle, "Монолитная плита 200 мм");

        req.floors = Floors::Two;
        let double = price(&req);
        assert!(close(double.raw_price(Category::Foundation).unwrap(), expected * 2.0));
        assert_eq!(double.items[0].volume, "35.2 м³");
    }

    #[test]
    fn test_strip_foundation() {
        let mut req = request();
        req.foundation = Foundation::Strip { slab_thickness_m: None };
        let priced = price(&req);
        // perimeter 36 m: 36 × 3500 + 8.64 m³ × 9000 + 720 kg × 90
        let strip = 36.0 * 3_500.0 + 8.64 * 9_000.0 + 720.0 * 90.0;
        assert!(close(priced.raw_price(Category::Foundation).unwrap(), strip));
        assert_eq!(priced.items[0].volume, "36 м.п.");
        assert_eq!(priced.items[0].subtitle, "Ленточный");
    }

    #[test]
    fn test_strip_with_upper_slab() {
        let mut req = request();
        req.floors = Floors::Two;
        req.foundation = Foundation::Strip {
            slab_thickness_m: Some(0.2),
        };
        let priced = price(&req);
        let strip = 36.0 * 3_500.0 + 8.64 * 9_000.0 + 720.0 * 90.0;
        let slab = 17.6 * 13_500.0 + 88.0 * 25.0 * 90.0;
        assert!(close(priced.raw_price(Category::Foundation).unwrap(), strip + slab));
        assert_eq!(priced.items[0].volume, "36 м.п. / 17.6 м³");
        assert_eq!(priced.items[0].subtitle, "Ленточный + плита 200 мм");
    }

    #[test]
    fn test_two_floor_metal_is_heavier() {
        let mut req = request();
        let single = price(&req).raw_price(Category::MetalStructure).unwrap();
        req.floors = Floors::Two;
        let double = price(&req).raw_price(Category::MetalStructure).unwrap();
        assert!(close(double, 80.0 * 0.070 * 185_000.0));
        assert!(double > single);
    }

    #[test]
    fn test_sandwich_roof() {
        let mut req = request();
        req.roof = Roof::Sandwich { thickness_mm: 150 };
        let priced = price(&req);
        assert!(close(priced.raw_price(Category::Roof).unwrap(), 96.0 * (1_100.0 + 3_600.0)));
        assert_eq!(priced.items[2].subtitle, "Сэндвич-панели 150 мм");
    }

    #[test]
    fn test_openings() {
        let mut req = request();
        req.gates = Some(Openings {
            count: 2,
            size: "3x4".to_string(),
        });
        req.windows = Some(Openings {
            count: 3,
            size: "1.2x2".to_string(),
        });
        req.doors = 1;
        let priced = price(&req);
        assert!(close(priced.raw_price(Category::Gates).unwrap(), 640_000.0));
        assert!(close(priced.raw_price(Category::Windows).unwrap(), 135_000.0));
        assert!(close(priced.raw_price(Category::Doors).unwrap(), 80_000.0));
        let last = priced.items.last().unwrap();
        assert_eq!(last.category, Category::Doors);
        assert_eq!(last.volume, "1 шт");
    }

    #[test]
    fn test_unknown_gate_size_is_rejected() {
        let mut req = request();
        req.gates = Some(Openings {
            count: 1,
            size: "9x9".to_string(),
        });
        let err = Pricer::new(&PriceBook::standard()).price(&req).unwrap_err();
        assert_eq!(err.field(), Some("gates.size"));
    }

    #[test]
    fn test_category_codes_are_sequential() {
        let codes: Vec<&str> = Category::ALL.iter().map(|c| c.code()).collect();
        assert_eq!(codes, vec!["01", "02", "03", "04", "05", "06", "07", "08"]);
    }
}
