use anyhow::Result;

use crate::points::Datapoints;
use crate::series::{AxisMode, Series};

/// Which semantic axis a format column (or an axis object) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coord {
    X,
    Y,
}

/// How to interpret one scalar slot of a point record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnFormat {
    pub x: bool,
    pub y: bool,
    /// Cleared by format negotiation for categorical axes so labels survive
    /// the numeric validation stage intact.
    pub number: bool,
    pub required: bool,
    pub default_value: Option<f64>,
    /// Whether the column participates in automatic range computation.
    pub compute_range: bool,
}

impl ColumnFormat {
    pub fn coordinate(coord: Coord) -> Self {
        Self {
            x: coord == Coord::X,
            y: coord == Coord::Y,
            number: true,
            required: true,
            default_value: None,
            compute_range: true,
        }
    }

    pub fn is_on(&self, coord: Coord) -> bool {
        match coord {
            Coord::X => self.x,
            Coord::Y => self.y,
        }
    }
}

/// Synthesize the default column format for a series.
///
/// Mirrors the host engine's own inference: an x column, a y column, and for
/// bars (or filled lines) a third baseline column that defaults to 0 and only
/// feeds range computation when the style pins the axis to zero. Horizontal
/// bars put the baseline on x instead of y.
pub fn default_format(series: &Series) -> Vec<ColumnFormat> {
    let mut format = vec![
        ColumnFormat::coordinate(Coord::X),
        ColumnFormat::coordinate(Coord::Y),
    ];

    if series.bars.show || (series.lines.show && series.lines.fill) {
        let auto_scale =
            (series.bars.show && series.bars.zero) || (series.lines.show && series.lines.zero);
        let mut baseline = ColumnFormat {
            y: true,
            number: true,
            required: false,
            default_value: Some(0.0),
            compute_range: auto_scale,
            ..ColumnFormat::default()
        };
        if series.bars.horizontal {
            baseline.y = false;
            baseline.x = true;
        }
        format.push(baseline);
    }

    format
}

/// Pipeline stage: mark categorical coordinate columns as non-numeric.
///
/// Must run before the numeric validation/formatting stage consumes the
/// descriptor. No-op unless at least one axis is in category mode. For value
/// (y) columns the range-computation flag is cleared as well, so raw labels
/// cannot skew the auto-computed range before indices are assigned.
pub fn negotiate_formats(series: &mut Series, datapoints: &mut Datapoints) -> Result<()> {
    let xcategory = series.xaxis.options.mode == AxisMode::Category;
    let ycategory = series.yaxis.options.mode == AxisMode::Category;

    if !(xcategory || ycategory) {
        return Ok(());
    }

    let format = datapoints
        .format
        .get_or_insert_with(|| default_format(series));
    datapoints.point_size = format.len();

    for column in format.iter_mut() {
        if column.x && xcategory {
            column.number = false;
        }
        if column.y && ycategory {
            column.number = false;
            column.compute_range = false;
        }
    }

    Ok(())
}
