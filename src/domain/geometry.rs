// Chart geometry: values to pixel coordinates inside a padded viewport
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Padding {
    pub const fn uniform(p: f64) -> Self {
        Self {
            left: p,
            right: p,
            top: p,
            bottom: p,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub padding: Padding,
}

impl Viewport {
    /// Soil moisture history sparkline.
    pub const HISTORY: Viewport = Viewport {
        width: 240.0,
        height: 90.0,
        padding: Padding::uniform(10.0),
    };

    /// Min/max forecast chart, with room for tick labels and a title.
    pub const WEATHER: Viewport = Viewport {
        width: 260.0,
        height: 140.0,
        padding: Padding {
            left: 32.0,
            right: 10.0,
            top: 30.0,
            bottom: 24.0,
        },
    };

    pub fn usable_width(&self) -> f64 {
        self.width - self.padding.left - self.padding.right
    }

    pub fn usable_height(&self) -> f64 {
        self.height - self.padding.top - self.padding.bottom
    }

    /// Left edge for a single point, evenly spread otherwise.
    pub fn x_at(&self, index: usize, count: usize) -> f64 {
        let steps = count.saturating_sub(1).max(1) as f64;
        self.padding.left + (index as f64 / steps) * self.usable_width()
    }

    pub fn y_for(&self, value: f64, domain: &Domain) -> f64 {
        self.padding.top + (1.0 - domain.normalize(value)) * self.usable_height()
    }
}

/// Value range drawn between the bottom and top of the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

pub const AUTO_SCALE_STEP: f64 = 5.0;
pub const AUTO_SCALE_MIN_SPAN: f64 = 10.0;
/// Upper bound on grid lines for a single axis.
pub const MAX_TICKS: usize = 64;

impl Domain {
    pub const PERCENT: Domain = Domain {
        min: 0.0,
        max: 100.0,
    };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Domain covering `values`, widened outward to multiples of 5 and to a
    /// span of at least 10. `None` when there is nothing to scale.
    pub fn auto_scaled<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let (lo, hi) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })?;

        let min = (lo / AUTO_SCALE_STEP).floor() * AUTO_SCALE_STEP;
        let mut max = (hi / AUTO_SCALE_STEP).ceil() * AUTO_SCALE_STEP;
        if max - min < AUTO_SCALE_MIN_SPAN {
            max = min + AUTO_SCALE_MIN_SPAN;
        }
        Some(Self::new(min, max))
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    /// Position of `value` within the domain, always in `[0, 1]`.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.span();
        if !(span > 0.0) || value.is_nan() {
            return 0.0;
        }
        clamp01((self.clamp(value) - self.min) / span)
    }

    /// Grid values from `min` to `max`: every 5 on narrow domains, every 10
    /// otherwise.
    pub fn ticks(&self) -> Vec<f64> {
        let span = self.span();
        if !span.is_finite() || span < 0.0 {
            return Vec::new();
        }
        let step = if span <= 20.0 { 5.0 } else { 10.0 };
        let count = (((span + 0.1) / step).floor() as usize + 1).min(MAX_TICKS);
        (0..count).map(|i| self.min + i as f64 * step).collect()
    }
}

pub fn clamp01(x: f64) -> f64 {
    x.max(0.0).min(1.0)
}

/// Map ordered values to plot coordinates. Callers render a placeholder
/// instead of calling this with no data.
pub fn map_points(values: &[f64], viewport: &Viewport, domain: &Domain) -> Vec<Point> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| Point {
            x: viewport.x_at(i, values.len()),
            y: viewport.y_for(v, domain),
        })
        .collect()
}

/// SVG `points` attribute: `x,y x,y ...`.
pub fn polyline(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Closed SVG path shading the area between two lines: `upper` forward, then
/// `lower` backward.
pub fn band_path(upper: &[Point], lower: &[Point]) -> Option<String> {
    let (first, rest) = upper.split_first()?;

    let mut parts = Vec::with_capacity(upper.len() + lower.len() + 1);
    parts.push(format!("M {} {}", first.x, first.y));
    parts.extend(rest.iter().map(|p| format!("L {} {}", p.x, p.y)));
    parts.extend(lower.iter().rev().map(|p| format!("L {} {}", p.x, p.y)));
    parts.push("Z".to_string());
    Some(parts.join(" "))
}
