use std::cmp::Ordering;

use crate::series::Axis;

/// One axis annotation: a numeric position and the label shown there.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub position: f64,
    pub label: String,
}

/// Tick generator for categorical axes.
///
/// Emits one tick per mapping entry whose index falls inside the visible
/// range `[axis.min, axis.max]`, sorted ascending by index. The sort is
/// stable, so labels sharing an index stay adjacent in mapping-iteration
/// order. Read-only with respect to the mapping; the renderer re-invokes it
/// on every redraw and zoom.
pub fn category_ticks(axis: &Axis) -> Vec<Tick> {
    let Some(category) = axis.category.as_ref() else {
        return Vec::new();
    };

    let mut ticks: Vec<Tick> = category
        .iter()
        .filter(|&(_, index)| index >= axis.min && index <= axis.max)
        .map(|(label, index)| Tick {
            position: index,
            label: label.to_string(),
        })
        .collect();

    ticks.sort_by(|a, b| {
        a.position
            .partial_cmp(&b.position)
            .unwrap_or(Ordering::Equal)
    });

    ticks
}
