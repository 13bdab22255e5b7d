//! Spline-wide switches and debug display settings

use flexspline_core::Color;
use serde::{Deserialize, Serialize};

/// Three-state override for a per-layer or per-point setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlobalSwitch {
    /// On for every layer or point
    Everywhere,
    /// Off for every layer or point
    Nowhere,
    /// Defer to the layer or point setting
    Custom,
}

impl GlobalSwitch {
    /// Resolve against the local setting
    pub fn resolve(self, local: bool) -> bool {
        match self {
            GlobalSwitch::Everywhere => true,
            GlobalSwitch::Nowhere => false,
            GlobalSwitch::Custom => local,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub collision: GlobalSwitch,
    pub looping: GlobalSwitch,
    pub synchronize: GlobalSwitch,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            collision: GlobalSwitch::Nowhere,
            looping: GlobalSwitch::Custom,
            synchronize: GlobalSwitch::Custom,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugSettings {
    pub show_point_numbers: bool,
    pub point_number_size: f32,
    pub up_arrow_size: f32,
    /// Distance from the label to the up indicator
    pub up_arrow_offset: f32,
    pub label_color: Color,
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self {
            show_point_numbers: false,
            point_number_size: 125.0,
            up_arrow_size: 3.0,
            up_arrow_offset: 25.0,
            label_color: Color::CYAN,
        }
    }
}
