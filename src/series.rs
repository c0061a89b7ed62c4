use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::category::{CategoryMap, CategorySpec};
use crate::format::Coord;
use crate::ticks::Tick;

/// How an axis interprets its coordinate values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum AxisMode {
    /// Coordinate values are textual labels mapped to numeric indices.
    #[serde(rename = "category")]
    Category,
    /// Plain numeric interpretation. Any unrecognized mode string (the host
    /// may define others, e.g. time axes) lands here and is left alone.
    #[serde(other)]
    #[default]
    Auto,
}

/// A tick generator installed on an axis, invoked by the renderer on every
/// redraw with the axis itself.
pub type TickGenerator = fn(&Axis) -> Vec<Tick>;

/// Host-configurable options for one axis.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AxisOptions {
    pub mode: AxisMode,
    /// Category configuration: a label sequence, an explicit label→index
    /// mapping, or absent (labels are then assigned in data order).
    pub category: CategorySpec,
    /// Custom tick generator, if the host configured one. The category
    /// mapper only installs its own generator when this is empty.
    #[serde(skip)]
    pub ticks: Option<TickGenerator>,
}

/// One axis of a series.
///
/// `category` is the finished label→index mapping, built once per data-load
/// cycle and kept for the axis's lifetime so consumers (tooltips, click
/// handlers) can invert indices back to labels. `min`/`max` describe the
/// currently visible numeric range and are maintained by the host.
#[derive(Debug, Clone, Default)]
pub struct Axis {
    pub options: AxisOptions,
    pub category: Option<CategoryMap>,
    pub min: f64,
    pub max: f64,
}

impl Axis {
    /// Generate ticks through the installed generator, if any.
    pub fn ticks(&self) -> Vec<Tick> {
        match self.options.ticks {
            Some(generate) => generate(self),
            None => Vec::new(),
        }
    }

    /// Drop the category mapping so the next processing pass rebuilds it.
    /// Required when category mode is toggled off and on again.
    pub fn reset_category(&mut self) {
        self.category = None;
    }
}

// Axis deserializes from its options object; runtime state starts fresh.
impl<'de> Deserialize<'de> for Axis {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let options = AxisOptions::deserialize(deserializer)?;
        Ok(Axis {
            options,
            ..Axis::default()
        })
    }
}

/// Bar rendering flags consumed by default-format synthesis.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct BarsOptions {
    pub show: bool,
    /// Pin the value axis to include zero.
    pub zero: bool,
    pub horizontal: bool,
}

/// Line rendering flags consumed by default-format synthesis.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct LinesOptions {
    pub show: bool,
    pub fill: bool,
    pub zero: bool,
}

/// One data series with its two axes and the style flags that drive
/// default-format inference.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Series {
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub bars: BarsOptions,
    pub lines: LinesOptions,
}

impl Series {
    /// Build a series from the host's JSON option tree, e.g.
    /// `{"xaxis": {"mode": "category", "category": ["Feb", "Mar"]}}`.
    pub fn from_json(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).context("Invalid series options")
    }

    pub fn axis(&self, coord: Coord) -> &Axis {
        match coord {
            Coord::X => &self.xaxis,
            Coord::Y => &self.yaxis,
        }
    }

    pub fn axis_mut(&mut self, coord: Coord) -> &mut Axis {
        match coord {
            Coord::X => &mut self.xaxis,
            Coord::Y => &mut self.yaxis,
        }
    }
}
