/// A requested sub-range of a recording, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimRange {
    pub start: f64,
    pub end: f64,
}

impl TrimRange {
    /// Build a range from optional form fields.
    ///
    /// `start` defaults to 0. Returns `None` unless `end` is present, both values
    /// are finite, `start >= 0` and `end > start`; callers then remux the whole file.
    pub fn from_fields(start: Option<f64>, end: Option<f64>) -> Option<Self> {
        let start = start.unwrap_or(0.0);
        let end = end?;

        if !start.is_finite() || !end.is_finite() || start < 0.0 || end <= start {
            return None;
        }

        Some(Self { start, end })
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}
