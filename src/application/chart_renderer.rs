// Chart renderer - Maps a timeseries onto the drawing description
use crate::domain::drawing::{
    DataPath, Drawing, GridLine, Margins, Plot, Segment, ThresholdLine, TickLabel, TimeTick,
    CANVAS_HEIGHT, CANVAS_WIDTH, MARGINS,
};
use crate::domain::threshold::{Threshold, ThresholdKind};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};

const Y_TICK_INTERVALS: usize = 5;
const MAX_TIME_TICKS: usize = 6;
const INVALID_DATE: &str = "Invalid Date";

pub const UPPER_THRESHOLD_COLOR: &str = "#ef4444";
pub const LOWER_THRESHOLD_COLOR: &str = "#3b82f6";

/// Render one series against its labels and thresholds.
///
/// Labels and data are paired by index; extra entries on the longer side
/// are ignored. With nothing to pair the result is the placeholder drawing.
/// Non-finite values leave a gap in the line.
pub fn render<L: AsRef<str>>(
    labels: &[L],
    data: &[f64],
    thresholds: &[Threshold],
    unit: &str,
    title: &str,
) -> Drawing {
    let n = labels.len().min(data.len());
    if labels.len() != data.len() {
        tracing::debug!(
            "Truncating chart '{}' to {} points (labels={}, data={})",
            title,
            n,
            labels.len(),
            data.len()
        );
    }
    if n == 0 {
        return Drawing::placeholder(title, unit);
    }

    let labels = &labels[..n];
    let data = &data[..n];
    let margins = MARGINS;

    let y = YScale::new(value_domain(data, thresholds), &margins);
    let x = XScale::new(n, &margins);
    let left = margins.left;
    let right = CANVAS_WIDTH - margins.right;
    let top = margins.top;
    let bottom = CANVAS_HEIGHT - margins.bottom;

    let y_grid = (0..=Y_TICK_INTERVALS)
        .map(|i| {
            let value = y.value_at(i as f64 / Y_TICK_INTERVALS as f64);
            GridLine {
                line: Segment::horizontal(left, right, y.apply(value)),
                value,
                label: format!("{:.2}", value),
            }
        })
        .collect();

    let x_ticks = time_tick_indices(n)
        .into_iter()
        .enumerate()
        .map(|(i, index)| TimeTick {
            index,
            line: Segment::vertical(x.apply(index), top, bottom),
            label: tick_label(labels[index].as_ref(), i == 0),
        })
        .collect();

    let mut path = DataPath::default();
    let mut run = Vec::new();
    for (i, v) in data.iter().enumerate() {
        if v.is_finite() {
            run.push((x.apply(i), y.apply(*v)));
        } else if !run.is_empty() {
            path.runs.push(std::mem::take(&mut run));
        }
    }
    if !run.is_empty() {
        path.runs.push(run);
    }

    let thresholds = thresholds
        .iter()
        .filter(|t| t.value.is_finite())
        .map(|t| ThresholdLine {
            line: Segment::horizontal(left, right, y.apply(t.value)),
            color: match t.kind {
                ThresholdKind::Upper => UPPER_THRESHOLD_COLOR,
                ThresholdKind::Lower => LOWER_THRESHOLD_COLOR,
            },
            caption: t.caption(),
        })
        .collect();

    Drawing {
        width: CANVAS_WIDTH,
        height: CANVAS_HEIGHT,
        title: title.to_string(),
        unit: unit.to_string(),
        plot: Some(Plot {
            margins,
            y_domain: (y.lo, y.hi),
            y_grid,
            x_ticks,
            path,
            thresholds,
            axes: vec![
                Segment::horizontal(left, right, bottom),
                Segment::vertical(left, top, bottom),
            ],
        }),
    }
}

/// Min/max over finite data and threshold values, widened by one unit on
/// each side when it collapses to a single value. The result always has
/// finite, strictly ordered bounds.
fn value_domain(data: &[f64], thresholds: &[Threshold]) -> (f64, f64) {
    let bounds = data
        .iter()
        .copied()
        .chain(thresholds.iter().map(|t| t.value))
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        });

    let (lo, hi) = match bounds {
        None => return (-1.0, 1.0),
        Some((lo, hi)) if lo == hi => (lo - 1.0, hi + 1.0),
        Some(domain) => domain,
    };
    if lo < hi {
        return (lo, hi);
    }
    // One unit is below float resolution at this magnitude.
    let pad = lo.abs() * f64::EPSILON * 4.0;
    ((lo - pad).max(f64::MIN), (hi + pad).min(f64::MAX))
}

struct YScale {
    lo: f64,
    hi: f64,
    top: f64,
    span: f64,
}

impl YScale {
    fn new((lo, hi): (f64, f64), margins: &Margins) -> Self {
        Self {
            lo,
            hi,
            top: margins.top,
            span: CANVAS_HEIGHT - margins.top - margins.bottom,
        }
    }

    /// Higher values map to smaller y.
    fn apply(&self, v: f64) -> f64 {
        self.top + (1.0 - self.fraction(v)) * self.span
    }

    /// Position of `v` within the domain, 0 at `lo` and 1 at `hi`. Halves
    /// the operands when the full span overflows.
    fn fraction(&self, v: f64) -> f64 {
        let width = self.hi - self.lo;
        if width.is_finite() {
            (v - self.lo) / width
        } else {
            (v * 0.5 - self.lo * 0.5) / (self.hi * 0.5 - self.lo * 0.5)
        }
    }

    /// Domain value at `t` in [0, 1].
    fn value_at(&self, t: f64) -> f64 {
        self.lo * (1.0 - t) + self.hi * t
    }
}

struct XScale {
    left: f64,
    span: f64,
    denominator: f64,
}

impl XScale {
    fn new(n: usize, margins: &Margins) -> Self {
        Self {
            left: margins.left,
            span: CANVAS_WIDTH - margins.left - margins.right,
            denominator: n.saturating_sub(1).max(1) as f64,
        }
    }

    fn apply(&self, index: usize) -> f64 {
        self.left + (index as f64 / self.denominator) * self.span
    }
}

/// Up to six evenly spaced indices; the first and last index are always included.
fn time_tick_indices(n: usize) -> Vec<usize> {
    let count = n.min(MAX_TIME_TICKS);
    let last = n.saturating_sub(1) as f64;
    let steps = count.saturating_sub(1).max(1) as f64;
    (0..count)
        .map(|i| (i as f64 * last / steps).round() as usize)
        .collect()
}

fn tick_label(raw: &str, first: bool) -> TickLabel {
    match parse_timestamp(raw) {
        Some(ts) => TickLabel {
            time: ts.format("%H:%M").to_string(),
            date: (first || ts.hour() == 0).then(|| format!("{}/{}", ts.month(), ts.day())),
        },
        None => TickLabel {
            time: INVALID_DATE.to_string(),
            date: None,
        },
    }
}

/// Wall-clock time of a label. Offsets are kept as written rather than
/// converted, so "10:00+02:00" reads as 10:00.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
