//! JSON map records.
//!
//! The map provider returns a document of the form:
//!
//! ```json
//! {
//!   "width": 3, "height": 2,
//!   "tiles": [["C","C","B"], "CCC"],
//!   "legend": { "C": {"name": "calle", "surface_weight": 1.0},
//!               "B": {"name": "edificio", "blocked": true} },
//!   "goal": 1500
//! }
//! ```
//!
//! Rows may be arrays of symbols or plain strings of one-character symbols.
//! The whole document may also be wrapped in a `{"data": ...}` envelope,
//! which the loader strips before decoding.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{GridMap, GridMapBuilder, MapError, MapResult, TileInfo};

// ── Records ───────────────────────────────────────────────────────────────────

/// One legend entry as delivered by the map provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
}

/// A tile row: either `["C","B"]` or `"CB"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TileRow {
    Symbols(Vec<String>),
    Compact(String),
}

impl TileRow {
    fn into_symbols(self) -> Vec<String> {
        match self {
            TileRow::Symbols(v) => v,
            TileRow::Compact(s) => s.chars().map(String::from).collect(),
        }
    }
}

/// Serializable form of a [`GridMap`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapRecord {
    pub width:  u32,
    pub height: u32,
    pub tiles:  Vec<TileRow>,
    #[serde(default)]
    pub legend: BTreeMap<String, LegendRecord>,
    #[serde(default)]
    pub goal:   f64,
}

impl MapRecord {
    /// Build the map, checking the declared size against the tile rows.
    pub fn into_map(self) -> MapResult<GridMap> {
        if self.tiles.len() as u32 != self.height {
            return Err(MapError::Dimensions {
                width:  self.width,
                height: self.height,
                what:   "tiles",
                got:    self.tiles.len(),
            });
        }

        let mut builder = GridMapBuilder::new().goal(self.goal);
        for (symbol, rec) in self.legend {
            builder = builder.legend(
                symbol,
                TileInfo::new(rec.name, rec.blocked.unwrap_or(false), rec.surface_weight.unwrap_or(1.0)),
            );
        }
        for row in self.tiles {
            let symbols = row.into_symbols();
            if symbols.len() as u32 != self.width {
                return Err(MapError::Dimensions {
                    width:  self.width,
                    height: self.height,
                    what:   "a tile row",
                    got:    symbols.len(),
                });
            }
            builder = builder.row(symbols);
        }
        builder.build()
    }
}

impl GridMap {
    /// Lossless record of this map, for snapshots.
    pub fn to_record(&self) -> MapRecord {
        MapRecord {
            width:  self.width(),
            height: self.height(),
            tiles:  self.rows().into_iter().map(TileRow::Symbols).collect(),
            legend: self
                .legend()
                .iter()
                .map(|(sym, info)| {
                    (
                        sym.clone(),
                        LegendRecord {
                            name:           info.name.clone(),
                            surface_weight: Some(info.surface_weight),
                            blocked:        Some(info.blocked),
                        },
                    )
                })
                .collect(),
            goal: self.goal(),
        }
    }
}

// ── Loaders ───────────────────────────────────────────────────────────────────

/// Parse a map document from any reader.
pub fn load_map_reader<R: Read>(reader: R) -> MapResult<GridMap> {
    let value: serde_json::Value =
        serde_json::from_reader(reader).map_err(|e| MapError::Parse(e.to_string()))?;
    let record: MapRecord = serde_json::from_value(unwrap_envelope(value))
        .map_err(|e| MapError::Parse(e.to_string()))?;
    let map = record.into_map()?;
    tracing::info!(width = map.width(), height = map.height(), goal = map.goal(), "map loaded");
    Ok(map)
}

/// Parse a map document from a file.
pub fn load_map_json(path: impl AsRef<Path>) -> MapResult<GridMap> {
    let file = std::fs::File::open(path)?;
    load_map_reader(std::io::BufReader::new(file))
}

/// Strip nested `{"data": ...}` wrappers.
fn unwrap_envelope(mut value: serde_json::Value) -> serde_json::Value {
    loop {
        match value {
            serde_json::Value::Object(mut obj) if obj.len() == 1 && obj.contains_key("data") => {
                value = obj.remove("data").unwrap_or_default();
            }
            other => return other,
        }
    }
}
