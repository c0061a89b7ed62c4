use std::collections::HashMap;

use anyhow::Result;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::format::Coord;
use crate::points::{Datapoints, Datum};
use crate::series::{Axis, AxisMode, Series};
use crate::ticks;

/// Resolved form of an axis's `category` option.
///
/// The host's JSON surface accepts either a label sequence or an explicit
/// label→index object; anything else means "assign indices lazily from data
/// order". Resolution happens once, at the deserialization boundary.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CategorySpec {
    #[default]
    Absent,
    /// Label at position `i` maps to index `i`.
    Sequence(Vec<String>),
    /// Explicit indices, copied verbatim. Duplicate indices across labels
    /// are accepted; the ticks for them simply coincide.
    Explicit(Vec<(String, f64)>),
}

impl CategorySpec {
    /// Resolve a raw JSON value. Malformed configuration degrades to
    /// `Absent` rather than failing; entries that are neither labels nor
    /// numbers are skipped.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(items) => {
                let labels = items.iter().filter_map(label_of).collect();
                CategorySpec::Sequence(labels)
            }
            Value::Object(entries) => {
                let pairs = entries
                    .iter()
                    .filter_map(|(label, index)| index.as_f64().map(|i| (label.clone(), i)))
                    .collect();
                CategorySpec::Explicit(pairs)
            }
            _ => CategorySpec::Absent,
        }
    }
}

fn label_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for CategorySpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(CategorySpec::from_value(&value))
    }
}

/// The label→index mapping owned by one axis.
///
/// Insertion order is preserved so tick generation and inverse lookups see
/// labels in the order they were configured or first encountered in data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoryMap {
    index: HashMap<String, f64>,
    order: Vec<String>,
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_spec(spec: &CategorySpec) -> Self {
        let mut map = CategoryMap::new();
        match spec {
            CategorySpec::Absent => {}
            CategorySpec::Sequence(labels) => {
                for (i, label) in labels.iter().enumerate() {
                    map.insert(label, i as f64);
                }
            }
            CategorySpec::Explicit(pairs) => {
                for (label, index) in pairs {
                    map.insert(label, *index);
                }
            }
        }
        map
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.index.get(label).copied()
    }

    pub fn insert(&mut self, label: &str, index: f64) {
        if !self.index.contains_key(label) {
            self.order.push(label.to_string());
        }
        self.index.insert(label.to_string(), index);
    }

    /// The next auto-assignable index: one past the maximum currently
    /// assigned, or 0 when the mapping is empty. Derived from the mapping
    /// contents on every call; there is no separate high-water mark.
    pub fn next_index(&self) -> f64 {
        let mut max = -1.0f64;
        for &index in self.index.values() {
            if index > max {
                max = index;
            }
        }
        max + 1.0
    }

    /// Look up a label, assigning it the next free index if unseen.
    pub fn assign(&mut self, label: &str) -> f64 {
        match self.get(label) {
            Some(index) => index,
            None => {
                let index = self.next_index();
                self.insert(label, index);
                index
            }
        }
    }

    /// Inverse lookup for tooltips and click handlers. With duplicate
    /// indices the earliest-inserted label wins.
    pub fn label_for(&self, index: f64) -> Option<&str> {
        self.iter()
            .find(|&(_, i)| i == index)
            .map(|(label, _)| label)
    }

    /// Iterate `(label, index)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.order
            .iter()
            .filter_map(|label| self.index.get(label).map(|&i| (label.as_str(), i)))
    }
}

/// Pipeline stage: establish category mappings and rewrite the point buffer.
///
/// Runs after the numeric validation stage, once per data-processing pass.
pub fn map_categories(series: &mut Series, datapoints: &mut Datapoints) -> Result<()> {
    for coord in [Coord::X, Coord::Y] {
        setup_axis(series.axis_mut(coord), coord, datapoints);
    }
    Ok(())
}

fn setup_axis(axis: &mut Axis, coord: Coord, datapoints: &mut Datapoints) {
    if axis.options.mode != AxisMode::Category {
        return;
    }

    // An existing mapping is never reconstructed; re-entrant passes must not
    // reset indices that consumers may already hold.
    let category = axis
        .category
        .get_or_insert_with(|| CategoryMap::from_spec(&axis.options.category));

    if axis.options.ticks.is_none() {
        axis.options.ticks = Some(ticks::category_ticks);
    }

    transform_points_on_axis(datapoints, coord, category);
}

/// Rewrite every label on `coord`'s columns to its mapped index, extending
/// the mapping with unseen labels in first-encounter order.
fn transform_points_on_axis(datapoints: &mut Datapoints, coord: Coord, category: &mut CategoryMap) {
    let Datapoints {
        points,
        point_size,
        format,
    } = datapoints;

    let Some(format) = format.as_deref() else {
        return;
    };
    if *point_size == 0 {
        return;
    }

    for record in points.chunks_mut(*point_size) {
        // A null leading slot marks the whole record as skipped (gap).
        if record.first().map_or(true, Datum::is_null) {
            continue;
        }

        for (slot, column) in record.iter_mut().zip(format.iter()) {
            if !column.is_on(coord) {
                continue;
            }
            let Some(label) = slot.label_key() else {
                continue;
            };
            *slot = Datum::Number(category.assign(&label));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format;
    use serde_json::json;

    fn category_datapoints(points: Vec<Datum>) -> Datapoints {
        let mut series = Series::default();
        series.xaxis.options.mode = AxisMode::Category;
        let mut datapoints = Datapoints::with_points(2, points);
        format::negotiate_formats(&mut series, &mut datapoints).unwrap();
        datapoints
    }

    fn x_category_series(spec: CategorySpec) -> Series {
        let mut series = Series::default();
        series.xaxis.options.mode = AxisMode::Category;
        series.xaxis.options.category = spec;
        series
    }

    fn labels(points: &[(&str, f64)]) -> Vec<Datum> {
        points
            .iter()
            .flat_map(|&(x, y)| [Datum::from(x), Datum::from(y)])
            .collect()
    }

    #[test]
    fn test_spec_from_json_array() {
        let spec = CategorySpec::from_value(&json!(["Feb", "Mar", "Apr"]));
        assert_eq!(
            spec,
            CategorySpec::Sequence(vec!["Feb".into(), "Mar".into(), "Apr".into()])
        );
    }

    #[test]
    fn test_spec_from_json_object_keeps_order() {
        let spec = CategorySpec::from_value(&json!({ "Mar": 3.0, "Feb": 1.0 }));
        assert_eq!(
            spec,
            CategorySpec::Explicit(vec![("Mar".into(), 3.0), ("Feb".into(), 1.0)])
        );
    }

    #[test]
    fn test_spec_from_malformed_json_degrades_to_absent() {
        assert_eq!(CategorySpec::from_value(&json!(42)), CategorySpec::Absent);
        assert_eq!(CategorySpec::from_value(&json!(null)), CategorySpec::Absent);
    }

    #[test]
    fn test_sequence_spec_maps_positions() {
        let map = CategoryMap::from_spec(&CategorySpec::Sequence(vec![
            "Feb".into(),
            "Mar".into(),
            "Apr".into(),
        ]));
        assert_eq!(map.get("Feb"), Some(0.0));
        assert_eq!(map.get("Mar"), Some(1.0));
        assert_eq!(map.get("Apr"), Some(2.0));
    }

    #[test]
    fn test_next_index_from_explicit_mapping() {
        let map = CategoryMap::from_spec(&CategorySpec::Explicit(vec![
            ("Feb".into(), 1.0),
            ("Mar".into(), 3.0),
        ]));
        assert_eq!(map.next_index(), 4.0);
        assert!(CategoryMap::new().next_index() == 0.0);
    }

    #[test]
    fn test_next_index_floors_at_zero_for_negative_indices() {
        let map = CategoryMap::from_spec(&CategorySpec::Explicit(vec![("low".into(), -5.0)]));
        assert_eq!(map.next_index(), 0.0);
    }

    #[test]
    fn test_label_for_prefers_first_inserted_on_ties() {
        let map = CategoryMap::from_spec(&CategorySpec::Explicit(vec![
            ("a".into(), 2.0),
            ("b".into(), 2.0),
        ]));
        assert_eq!(map.label_for(2.0), Some("a"));
        assert_eq!(map.label_for(7.0), None);
    }

    #[test]
    fn test_lazy_indices_follow_first_encounter_order() {
        let mut series = x_category_series(CategorySpec::Absent);
        let mut datapoints =
            category_datapoints(labels(&[("b", 1.0), ("a", 2.0), ("b", 3.0), ("c", 4.0)]));
        map_categories(&mut series, &mut datapoints).unwrap();

        let map = series.xaxis.category.as_ref().unwrap();
        assert_eq!(map.get("b"), Some(0.0));
        assert_eq!(map.get("a"), Some(1.0));
        assert_eq!(map.get("c"), Some(2.0));
        assert_eq!(
            datapoints.points,
            vec![
                Datum::from(0.0),
                Datum::from(1.0),
                Datum::from(1.0),
                Datum::from(2.0),
                Datum::from(0.0),
                Datum::from(3.0),
                Datum::from(2.0),
                Datum::from(4.0),
            ]
        );
    }

    #[test]
    fn test_explicit_mapping_gap_fills_past_max() {
        let mut series = x_category_series(CategorySpec::Explicit(vec![
            ("Feb".into(), 1.0),
            ("Mar".into(), 3.0),
        ]));
        let mut datapoints =
            category_datapoints(labels(&[("Feb", 10.0), ("Apr", 20.0), ("Mar", 30.0)]));
        map_categories(&mut series, &mut datapoints).unwrap();

        let map = series.xaxis.category.as_ref().unwrap();
        assert_eq!(map.get("Feb"), Some(1.0));
        assert_eq!(map.get("Mar"), Some(3.0));
        assert_eq!(map.get("Apr"), Some(4.0));
    }

    #[test]
    fn test_null_values_are_preserved() {
        let mut series = x_category_series(CategorySpec::Absent);
        let mut datapoints = category_datapoints(vec![
            Datum::from("a"),
            Datum::from(1.0),
            Datum::Null,
            Datum::from(2.0),
            Datum::from("b"),
            Datum::Null,
        ]);
        map_categories(&mut series, &mut datapoints).unwrap();

        // Null leading slot: record skipped whole. Null later slot: left as-is.
        assert_eq!(datapoints.points[2], Datum::Null);
        assert_eq!(datapoints.points[5], Datum::Null);
        let map = series.xaxis.category.as_ref().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("b"), Some(1.0));
    }

    #[test]
    fn test_repeat_pass_keeps_existing_indices_and_appends_new() {
        let mut series = x_category_series(CategorySpec::Absent);
        let mut first = category_datapoints(labels(&[("a", 1.0), ("b", 2.0)]));
        map_categories(&mut series, &mut first).unwrap();

        let mut second = category_datapoints(labels(&[("b", 5.0), ("c", 6.0), ("a", 7.0)]));
        map_categories(&mut series, &mut second).unwrap();

        let map = series.xaxis.category.as_ref().unwrap();
        assert_eq!(map.get("a"), Some(0.0));
        assert_eq!(map.get("b"), Some(1.0));
        assert_eq!(map.get("c"), Some(2.0));
        assert_eq!(second.points[0], Datum::from(1.0));
    }

    #[test]
    fn test_deterministic_across_fresh_passes() {
        let input = labels(&[("q3", 1.0), ("q1", 2.0), ("q2", 3.0), ("q1", 4.0)]);

        let run = |points: Vec<Datum>| {
            let mut series = x_category_series(CategorySpec::Absent);
            let mut datapoints = category_datapoints(points);
            map_categories(&mut series, &mut datapoints).unwrap();
            (series.xaxis.category.unwrap(), datapoints.points)
        };

        let (map_a, points_a) = run(input.clone());
        let (map_b, points_b) = run(input);
        assert_eq!(map_a, map_b);
        assert_eq!(points_a, points_b);
    }

    #[test]
    fn test_existing_mapping_is_not_reconstructed() {
        let mut series = x_category_series(CategorySpec::Sequence(vec!["z".into()]));
        let mut prebuilt = CategoryMap::new();
        prebuilt.insert("kept", 9.0);
        series.xaxis.category = Some(prebuilt);

        let mut datapoints = category_datapoints(labels(&[("a", 1.0)]));
        map_categories(&mut series, &mut datapoints).unwrap();

        let map = series.xaxis.category.as_ref().unwrap();
        assert_eq!(map.get("kept"), Some(9.0));
        assert_eq!(map.get("z"), None);
        assert_eq!(map.get("a"), Some(10.0));
    }

    #[test]
    fn test_non_category_axis_is_untouched() {
        let mut series = Series::default();
        let mut datapoints = Datapoints::with_points(2, labels(&[("a", 1.0)]));
        map_categories(&mut series, &mut datapoints).unwrap();

        assert!(series.xaxis.category.is_none());
        assert!(series.xaxis.options.ticks.is_none());
        assert_eq!(datapoints.points[0], Datum::from("a"));
    }

    #[test]
    fn test_custom_tick_generator_is_kept() {
        fn custom(_: &Axis) -> Vec<crate::ticks::Tick> {
            Vec::new()
        }

        let mut series = x_category_series(CategorySpec::Absent);
        series.xaxis.options.ticks = Some(custom);
        let mut datapoints = category_datapoints(labels(&[("a", 1.0)]));
        map_categories(&mut series, &mut datapoints).unwrap();

        let installed = series.xaxis.options.ticks.unwrap();
        let expected: crate::series::TickGenerator = custom;
        assert!(installed == expected);
    }

    #[test]
    fn test_numeric_values_map_by_display_string() {
        let mut series = x_category_series(CategorySpec::Absent);
        let mut datapoints = category_datapoints(vec![
            Datum::from(2024.0),
            Datum::from(1.0),
            Datum::from("2024"),
            Datum::from(2.0),
        ]);
        map_categories(&mut series, &mut datapoints).unwrap();

        let map = series.xaxis.category.as_ref().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("2024"), Some(0.0));
        assert_eq!(datapoints.points[2], Datum::from(0.0));
    }
}
