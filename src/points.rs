use crate::format::ColumnFormat;

/// One scalar slot of a point record.
///
/// The pipeline's raw data mixes textual labels and numbers in the same
/// buffer; after category mapping every non-null slot is numeric.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    /// Missing value. A `Null` in the leading slot marks the whole record
    /// as skipped (e.g. a gap between bars).
    Null,
    Number(f64),
    Label(String),
}

impl Datum {
    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Datum::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The string key this value maps under. Numbers are keyed by their
    /// display form, so `34.0` and the label `"34"` share one category.
    pub fn label_key(&self) -> Option<String> {
        match self {
            Datum::Null => None,
            Datum::Number(n) => Some(n.to_string()),
            Datum::Label(s) => Some(s.clone()),
        }
    }
}

impl From<f64> for Datum {
    fn from(n: f64) -> Self {
        Datum::Number(n)
    }
}

impl From<&str> for Datum {
    fn from(s: &str) -> Self {
        Datum::Label(s.to_string())
    }
}

impl From<String> for Datum {
    fn from(s: String) -> Self {
        Datum::Label(s)
    }
}

/// The point buffer for one series: a flat sequence of scalars grouped into
/// fixed-size records, plus the column-format descriptor shared with the
/// formatting stage. Owned by one series for the duration of one processing
/// pass and mutated in place.
#[derive(Debug, Clone, Default)]
pub struct Datapoints {
    pub points: Vec<Datum>,
    /// Number of scalar slots per record; matches the format length once a
    /// format has been negotiated.
    pub point_size: usize,
    pub format: Option<Vec<ColumnFormat>>,
}

impl Datapoints {
    pub fn new(point_size: usize) -> Self {
        Self {
            points: Vec::new(),
            point_size,
            format: None,
        }
    }

    pub fn with_points(point_size: usize, points: Vec<Datum>) -> Self {
        Self {
            points,
            point_size,
            format: None,
        }
    }

    /// Append one record. Missing trailing slots are padded with `Null` so
    /// the buffer stays record-aligned.
    pub fn push_record<I>(&mut self, record: I)
    where
        I: IntoIterator<Item = Datum>,
    {
        let start = self.points.len();
        self.points.extend(record);
        let written = self.points.len() - start;
        for _ in written..self.point_size {
            self.points.push(Datum::Null);
        }
    }

    /// Iterate the buffer record by record.
    pub fn records(&self) -> impl Iterator<Item = &[Datum]> {
        self.points.chunks(self.point_size.max(1))
    }
}
