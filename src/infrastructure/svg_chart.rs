// SVG rendering of the soil history and forecast charts
use crate::domain::forecast::ForecastDay;
use crate::domain::geometry::{band_path, map_points, polyline, Domain, Point, Viewport};
use crate::domain::history::HistorySeries;
use std::fmt::Write;

const AXIS: &str = "#9ca3af";
const GRID: &str = "#e5e7eb";
const TEXT: &str = "#6b7280";
const SOIL_LINE: &str = "#22c55e";
const MAX_LINE: &str = "#ef4444";
const MIN_LINE: &str = "#3b82f6";
const BAND_FILL: &str = "#fecaca";

/// Sparkline of the soil moisture history with first/last time labels.
pub fn render_history_chart(history: &HistorySeries, labels: &[String]) -> String {
    let vp = Viewport::HISTORY;
    let values = history.values();
    let Some(domain) = Domain::auto_scaled(values.iter().copied()) else {
        return placeholder(&vp);
    };

    let points = map_points(&values, &vp, &domain);
    let left = vp.padding.left;
    let right = vp.width - vp.padding.right;
    let top = vp.padding.top;
    let bottom = vp.height - vp.padding.bottom;

    let mut svg = open_svg(&vp);
    line(&mut svg, left, bottom, right, bottom, GRID, 1.0);
    line(&mut svg, left, top, left, bottom, GRID, 1.0);

    text(&mut svg, left + 2.0, top + 8.0, "start", 8, &format!("{:.1}", domain.max));
    text(&mut svg, left + 2.0, bottom - 2.0, "start", 8, &format!("{:.1}", domain.min));
    if let (Some(first), Some(last)) = (labels.first(), labels.last()) {
        text(&mut svg, left, vp.height - 1.0, "start", 8, first);
        text(&mut svg, right, vp.height - 1.0, "end", 8, last);
    }

    let _ = write!(
        svg,
        r#"<polyline fill="none" stroke="{}" stroke-width="2" points="{}"/>"#,
        SOIL_LINE,
        polyline(&points)
    );
    svg.push_str("</svg>");
    svg
}

/// Daily min/max lines over a shaded band, with a y-axis grid and day labels.
pub fn render_weather_chart(days: &[ForecastDay]) -> String {
    let vp = Viewport::WEATHER;
    let Some(domain) = Domain::auto_scaled(days.iter().flat_map(|d| [d.min, d.max])) else {
        return placeholder(&vp);
    };

    let maxes: Vec<f64> = days.iter().map(|d| d.max).collect();
    let mins: Vec<f64> = days.iter().map(|d| d.min).collect();
    let max_points = map_points(&maxes, &vp, &domain);
    let min_points = map_points(&mins, &vp, &domain);

    let left = vp.padding.left;
    let right = vp.width - vp.padding.right;
    let top = vp.padding.top;
    let bottom = vp.height - vp.padding.bottom;

    let mut svg = open_svg(&vp);

    for tick in domain.ticks() {
        let y = vp.y_for(tick, &domain);
        line(&mut svg, left, y, right, y, GRID, 0.5);
        text(&mut svg, left - 4.0, y + 3.0, "end", 9, &tick.to_string());
    }

    line(&mut svg, left, top, left, bottom, AXIS, 1.0);
    line(&mut svg, left, bottom, right, bottom, AXIS, 1.0);

    if let Some(band) = band_path(&max_points, &min_points) {
        let _ = write!(
            svg,
            r#"<path d="{}" fill="{}" fill-opacity="0.6" stroke="none"/>"#,
            band, BAND_FILL
        );
    }

    series(&mut svg, &max_points, MAX_LINE);
    series(&mut svg, &min_points, MIN_LINE);

    for (i, day) in days.iter().enumerate() {
        let x = vp.x_at(i, days.len());
        text(&mut svg, x, vp.height - 6.0, "middle", 9, &day.label);
    }

    let title_x = left + vp.usable_width() / 2.0;
    let _ = write!(
        svg,
        r##"<text x="{}" y="{}" text-anchor="middle" font-size="10" fill="#374151">Temperature (°C)</text>"##,
        title_x,
        top - 10.0
    );

    svg.push_str("</svg>");
    svg
}

fn series(svg: &mut String, points: &[Point], color: &str) {
    let _ = write!(
        svg,
        r#"<polyline fill="none" stroke="{}" stroke-width="2" points="{}"/>"#,
        color,
        polyline(points)
    );
    for p in points {
        let _ = write!(svg, r#"<circle cx="{}" cy="{}" r="2" fill="{}"/>"#, p.x, p.y, color);
    }
}

fn placeholder(vp: &Viewport) -> String {
    let mut svg = open_svg(vp);
    text(&mut svg, vp.width / 2.0, vp.height / 2.0, "middle", 11, "No data yet");
    svg.push_str("</svg>");
    svg
}

fn open_svg(vp: &Viewport) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = vp.width,
        h = vp.height
    )
}

fn line(svg: &mut String, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str, width: f64) {
    let _ = write!(
        svg,
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}"/>"#,
        x1, y1, x2, y2, stroke, width
    );
}

fn text(svg: &mut String, x: f64, y: f64, anchor: &str, size: u32, content: &str) {
    let _ = write!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="{}" font-size="{}" fill="{}">{}</text>"#,
        x,
        y,
        anchor,
        size,
        TEXT,
        escape(content)
    );
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
