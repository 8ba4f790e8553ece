// Drawing description produced by the chart renderer

pub const CANVAS_WIDTH: f64 = 900.0;
pub const CANVAS_HEIGHT: f64 = 320.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

/// Room reserved around the plot for axis labels.
pub const MARGINS: Margins = Margins {
    left: 56.0,
    right: 16.0,
    top: 32.0,
    bottom: 40.0,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Segment {
    pub fn horizontal(x1: f64, x2: f64, y: f64) -> Self {
        Self { x1, y1: y, x2, y2: y }
    }

    pub fn vertical(x: f64, y1: f64, y2: f64) -> Self {
        Self { x1: x, y1, x2: x, y2 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    pub line: Segment,
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickLabel {
    pub time: String,
    /// Month/day line, present on the first tick and at midnight.
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeTick {
    pub index: usize,
    pub line: Segment,
    pub label: TickLabel,
}

/// Polyline split into runs of consecutive drawable points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataPath {
    pub runs: Vec<Vec<(f64, f64)>>,
}

impl DataPath {
    #[cfg(test)]
    pub fn points(&self) -> impl Iterator<Item = &(f64, f64)> {
        self.runs.iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|run| run.is_empty())
    }

    /// SVG path data, e.g. "M 56.00 280.00 L 884.00 32.00"
    pub fn to_path_data(&self) -> String {
        let mut commands = Vec::new();
        for run in &self.runs {
            for (i, (x, y)) in run.iter().enumerate() {
                let op = if i == 0 { 'M' } else { 'L' };
                commands.push(format!("{} {:.2} {:.2}", op, x, y));
            }
        }
        commands.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdLine {
    pub line: Segment,
    pub color: &'static str,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plot {
    pub margins: Margins,
    pub y_domain: (f64, f64),
    pub y_grid: Vec<GridLine>,
    pub x_ticks: Vec<TimeTick>,
    pub path: DataPath,
    pub thresholds: Vec<ThresholdLine>,
    pub axes: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Drawing {
    pub width: f64,
    pub height: f64,
    pub title: String,
    pub unit: String,
    /// `None` for the "no data" placeholder.
    pub plot: Option<Plot>,
}

impl Drawing {
    pub fn placeholder(title: &str, unit: &str) -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            title: title.to_string(),
            unit: unit.to_string(),
            plot: None,
        }
    }

    #[cfg(test)]
    pub fn is_placeholder(&self) -> bool {
        self.plot.is_none()
    }
}
