use serde::{Deserialize, Serialize};

/// Per-courier constants.  Both agents share one config per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourierConfig {
    /// Inventory capacity.
    pub max_weight: f64,
    pub stamina_max: f64,
    pub start_stamina: f64,
    pub start_reputation: i32,
    /// Stamina spent per cell before load and weather surcharges.
    pub base_move_cost: f64,
    /// Load carried for free; each unit above costs `load_surcharge` per cell.
    pub free_load: f64,
    pub load_surcharge: f64,
}

impl Default for CourierConfig {
    fn default() -> Self {
        Self {
            max_weight:       10.0,
            stamina_max:      100.0,
            start_stamina:    100.0,
            start_reputation: 70,
            base_move_cost:   0.5,
            free_load:        3.0,
            load_surcharge:   0.2,
        }
    }
}
