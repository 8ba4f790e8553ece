// Mapper to serialize drawings as SVG documents
use crate::domain::drawing::{Drawing, Plot};

/// Band above the plot holding the title and unit.
const HEADER_HEIGHT: f64 = 28.0;
const PLACEHOLDER_BODY_HEIGHT: f64 = 32.0;
const LABEL_COLOR: &str = "#6b7280";
const LINE_COLOR: &str = "#111827";

pub fn drawing_to_svg(drawing: &Drawing) -> String {
    let body_height = match drawing.plot {
        Some(_) => drawing.height,
        None => PLACEHOLDER_BODY_HEIGHT,
    };
    let total_height = HEADER_HEIGHT + body_height;

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
        w = drawing.width,
        h = total_height
    );
    svg.push_str(&header(drawing));

    match &drawing.plot {
        Some(plot) => {
            svg.push_str(&format!(
                r#"<g transform="translate(0,{})">"#,
                HEADER_HEIGHT
            ));
            svg.push_str(&plot_body(drawing, plot));
            svg.push_str("</g>");
        }
        None => {
            svg.push_str(&format!(
                r#"<text x="0" y="{:.2}" font-size="13" fill="{}">No data.</text>"#,
                HEADER_HEIGHT + 18.0,
                LABEL_COLOR
            ));
        }
    }

    svg.push_str("</svg>");
    svg
}

fn header(drawing: &Drawing) -> String {
    let mut out = format!(
        r#"<text x="0" y="18" font-size="16" font-weight="600">{}</text>"#,
        escape_text(&drawing.title)
    );
    if !drawing.unit.is_empty() {
        out.push_str(&format!(
            r#"<text x="{}" y="18" text-anchor="end" font-size="13" fill="{}">Unit: {}</text>"#,
            drawing.width,
            LABEL_COLOR,
            escape_text(&drawing.unit)
        ));
    }
    out
}

fn plot_body(drawing: &Drawing, plot: &Plot) -> String {
    let margins = plot.margins;
    let mut out = format!(
        r#"<rect x="0" y="0" width="{}" height="{}" fill="white"/>"#,
        drawing.width, drawing.height
    );

    for grid in &plot.y_grid {
        out.push_str(&format!(
            r##"<line x1="{:.2}" x2="{:.2}" y1="{:.2}" y2="{:.2}" stroke="#eee"/>"##,
            grid.line.x1, grid.line.x2, grid.line.y1, grid.line.y2
        ));
        out.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" text-anchor="end" font-size="10" fill="{}">{}</text>"#,
            margins.left - 8.0,
            grid.line.y1 + 4.0,
            LABEL_COLOR,
            escape_text(&grid.label)
        ));
    }

    for tick in &plot.x_ticks {
        let x = tick.line.x1;
        out.push_str(&format!(
            r##"<line x1="{:.2}" x2="{:.2}" y1="{:.2}" y2="{:.2}" stroke="#f5f5f5"/>"##,
            x, x, tick.line.y1, tick.line.y2
        ));
        let mut text = format!(
            r#"<text x="{x:.2}" y="{:.2}" text-anchor="middle" font-size="10" fill="{}"><tspan x="{x:.2}">{}</tspan>"#,
            drawing.height - margins.bottom + 12.0,
            LABEL_COLOR,
            escape_text(&tick.label.time),
            x = x
        );
        if let Some(date) = &tick.label.date {
            text.push_str(&format!(
                r#"<tspan x="{:.2}" dy="12">{}</tspan>"#,
                x,
                escape_text(date)
            ));
        }
        text.push_str("</text>");
        out.push_str(&text);
    }

    if !plot.path.is_empty() {
        out.push_str(&format!(
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="1.8"/>"#,
            plot.path.to_path_data(),
            LINE_COLOR
        ));
    }

    for threshold in &plot.thresholds {
        let line = threshold.line;
        out.push_str(&format!(
            r#"<line x1="{:.2}" x2="{:.2}" y1="{:.2}" y2="{:.2}" stroke="{}" stroke-dasharray="4 4"/>"#,
            line.x1, line.x2, line.y1, line.y2, threshold.color
        ));
        out.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" text-anchor="end" font-size="10" fill="{}">{}</text>"#,
            line.x2,
            line.y1 - 4.0,
            LABEL_COLOR,
            escape_text(&threshold.caption)
        ));
    }

    for axis in &plot.axes {
        out.push_str(&format!(
            r##"<line x1="{:.2}" x2="{:.2}" y1="{:.2}" y2="{:.2}" stroke="#e5e7eb"/>"##,
            axis.x1, axis.x2, axis.y1, axis.y2
        ));
    }

    out
}

fn escape_text(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::chart_renderer::render;
    use crate::domain::threshold::{Threshold, ThresholdKind};

    #[test]
    fn test_placeholder_has_no_plot_geometry() {
        let svg = drawing_to_svg(&render::<String>(&[], &[], &[], "ppm", "CO2 <indoor>"));
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("No data."));
        assert!(svg.contains("CO2 &lt;indoor&gt;"));
        assert!(svg.contains("Unit: ppm"));
        assert!(!svg.contains("<path"));
        assert!(!svg.contains("<line"));
        assert!(!svg.contains("NaN"));
        assert!(!svg.contains("inf"));
    }

    #[test]
    fn test_plot_elements() {
        let labels = vec![
            "2024-05-01T00:00:00".to_string(),
            "2024-05-01T01:00:00".to_string(),
            "2024-05-01T02:00:00".to_string(),
        ];
        let thresholds = vec![
            Threshold::new("WHO", ThresholdKind::Lower, 18.0),
            Threshold::new("WHO", ThresholdKind::Upper, 24.0),
        ];
        let svg = drawing_to_svg(&render(&labels, &[19.0, 21.5, 23.0], &thresholds, "°C", "Temp"));

        assert_eq!(svg.matches("<path").count(), 1);
        assert_eq!(svg.matches("stroke=\"#eee\"").count(), 6);
        assert_eq!(svg.matches("stroke-dasharray=\"4 4\"").count(), 2);
        assert!(svg.contains("stroke=\"#ef4444\""));
        assert!(svg.contains("stroke=\"#3b82f6\""));
        assert!(svg.contains(">WHO: 18<"));
        assert!(svg.contains(">WHO: 24<"));
        assert!(svg.contains("<tspan x=\"56.00\">00:00</tspan><tspan x=\"56.00\" dy=\"12\">5/1</tspan>"));
        assert!(svg.contains("Unit: °C"));
        assert!(svg.contains("d=\"M 56.00"));
    }

    #[test]
    fn test_empty_unit_omits_unit_text() {
        let labels = vec!["2024-05-01T00:00:00".to_string()];
        let svg = drawing_to_svg(&render(&labels, &[1.0], &[], "", "t"));
        assert!(!svg.contains("Unit:"));
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text(r#"a&b "c" 'd'"#), "a&amp;b &quot;c&quot; &apos;d&apos;");
    }
}
