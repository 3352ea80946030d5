//! Summary donut chart.
//!
//! The chart is laid out as an SVG document and rasterized to PNG with
//! `resvg`. Layout is a pure function of (mode, summary, size), so two runs
//! with the same counts produce the same SVG; only font rasterization can
//! differ between machines.

use std::f64::consts::PI;
use std::fmt::Write as _;

use resvg::tiny_skia;
use resvg::usvg;

use payrecon_recon::summary::{format_thousands, SUMMARY_LABELS};
use payrecon_recon::{ReconError, Summary};

/// Segment colours in summary order.
pub const SEGMENT_COLORS: [&str; 5] = ["#ff9999", "#66b3ff", "#99ff99", "#ffcc99", "#c2c2f0"];

/// Category names shown on the chart, in summary order.
pub const CHART_CATEGORIES: [&str; 5] = [
    "Total Collection CIS Records",
    "Total MIS Records",
    SUMMARY_LABELS[2],
    SUMMARY_LABELS[3],
    SUMMARY_LABELS[4],
];

/// Ring colour when every counter is zero.
pub const EMPTY_RING_COLOR: &str = "#e0e0e0";

/// Inner hole radius as a fraction of the outer radius.
pub const HOLE_RATIO: f64 = 0.70;

const SEPARATOR_WIDTH: f64 = 5.0;
const FONT_FAMILY: &str = "DejaVu Sans, Arial, Helvetica, sans-serif";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
        }
    }
}

impl From<payrecon_config::ChartSettings> for ChartOptions {
    fn from(s: payrecon_config::ChartSettings) -> Self {
        Self {
            width: s.width,
            height: s.height,
        }
    }
}

/// Ring geometry derived from the canvas size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingGeometry {
    pub cx: f64,
    pub cy: f64,
    pub outer: f64,
    pub inner: f64,
}

impl RingGeometry {
    pub fn for_canvas(options: &ChartOptions) -> Self {
        let w = options.width as f64;
        let h = options.height as f64;
        // Leave room for the two title lines above the ring
        let title_band = (h * 0.12).min(48.0);
        let outer = ((h - title_band) * 0.36).min(w * 0.22);
        Self {
            cx: w / 2.0,
            cy: title_band + (h - title_band) / 2.0,
            outer,
            inner: outer * HOLE_RATIO,
        }
    }

    /// Point at `radius`, `angle` degrees clockwise from 12 o'clock.
    pub fn point(&self, radius: f64, angle: f64) -> (f64, f64) {
        let rad = angle * PI / 180.0;
        (self.cx + radius * rad.sin(), self.cy - radius * rad.cos())
    }
}

/// One segment's share of the ring, in degrees clockwise from 12 o'clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: f64,
    pub sweep: f64,
    pub count: usize,
    pub percent: f64,
}

/// Angular layout of the five counters. All-zero summaries get zero sweeps.
pub fn segments(summary: &Summary) -> [Segment; 5] {
    let counts = summary.counts();
    let total = summary.total() as f64;
    let mut start = 0.0;
    let mut out = [Segment {
        start: 0.0,
        sweep: 0.0,
        count: 0,
        percent: 0.0,
    }; 5];
    for (i, &count) in counts.iter().enumerate() {
        let fraction = if total > 0.0 { count as f64 / total } else { 0.0 };
        out[i] = Segment {
            start,
            sweep: fraction * 360.0,
            count,
            percent: fraction * 100.0,
        };
        start += fraction * 360.0;
    }
    out
}

/// Build the chart as an SVG document.
pub fn render_svg(mode: &str, summary: &Summary, options: &ChartOptions) -> String {
    let geo = RingGeometry::for_canvas(options);
    let segs = segments(summary);
    let mut svg = String::new();

    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = options.width,
        h = options.height
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);

    // Title
    let _ = writeln!(
        svg,
        r#"<text x="{x:.1}" y="24" font-family="{FONT_FAMILY}" font-size="18" text-anchor="middle" fill="black">{title}</text>"#,
        x = geo.cx,
        title = escape_xml(&format!("{mode} Reconciliation Summary"))
    );
    let _ = writeln!(
        svg,
        r#"<text x="{x:.1}" y="44" font-family="{FONT_FAMILY}" font-size="18" text-anchor="middle" fill="black">Counts and Matches</text>"#,
        x = geo.cx
    );

    // Ring
    if summary.total() == 0 {
        let _ = writeln!(svg, r#"<path d="{}" fill="{EMPTY_RING_COLOR}" fill-rule="evenodd"/>"#, ring_path(&geo));
    } else {
        for (seg, color) in segs.iter().zip(SEGMENT_COLORS) {
            if seg.count == 0 {
                continue;
            }
            let d = if seg.sweep >= 359.999 {
                ring_path(&geo)
            } else {
                wedge_path(&geo, seg.start, seg.sweep)
            };
            let _ = writeln!(
                svg,
                r#"<path d="{d}" fill="{color}" fill-rule="evenodd" stroke="white" stroke-width="{SEPARATOR_WIDTH}" stroke-linejoin="round"/>"#
            );
        }
    }

    // Labels: category + count outside the ring, percentage inside the band
    for (i, (seg, category)) in segs.iter().zip(CHART_CATEGORIES).enumerate() {
        // An empty ring has no sweeps to anchor on, so spread the labels evenly
        let mid = if summary.total() == 0 {
            i as f64 * 72.0 + 36.0
        } else {
            seg.start + seg.sweep / 2.0
        };
        let (lx, ly) = geo.point(geo.outer * 1.12, mid);
        let anchor = if lx >= geo.cx + 0.5 { "start" } else { "end" };
        let _ = writeln!(
            svg,
            r#"<text x="{lx:.1}" y="{ly:.1}" font-family="{FONT_FAMILY}" font-size="11" text-anchor="{anchor}" fill="black"><tspan x="{lx:.1}">{name}</tspan><tspan x="{lx:.1}" dy="13">{count}</tspan></text>"#,
            name = escape_xml(category),
            count = format_thousands(seg.count)
        );

        if summary.total() > 0 {
            let (px, py) = geo.point((geo.outer + geo.inner) / 2.0, mid);
            let _ = writeln!(
                svg,
                r#"<text x="{px:.1}" y="{py:.1}" font-family="{FONT_FAMILY}" font-size="10" text-anchor="middle" dominant-baseline="central" fill="black">{pct:.1}%</text>"#,
                pct = seg.percent
            );
        }
    }

    svg.push_str("</svg>\n");
    svg
}

/// Render the chart to PNG bytes.
pub fn render_chart(mode: &str, summary: &Summary, options: &ChartOptions) -> Result<Vec<u8>, ReconError> {
    let svg = render_svg(mode, summary, options);

    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(&svg, &opt)
        .map_err(|e| ReconError::Render(format!("invalid chart SVG: {e}")))?;
    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height()).ok_or_else(|| {
        ReconError::Render(format!(
            "cannot allocate {}x{} chart canvas",
            size.width(),
            size.height()
        ))
    })?;
    pixmap.fill(tiny_skia::Color::WHITE);
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| ReconError::Render(format!("PNG encoding failed: {e}")))
}

/// Annular sector between `start` and `start + sweep` degrees.
fn wedge_path(geo: &RingGeometry, start: f64, sweep: f64) -> String {
    let end = start + sweep;
    let large = if sweep > 180.0 { 1 } else { 0 };
    let (ox0, oy0) = geo.point(geo.outer, start);
    let (ox1, oy1) = geo.point(geo.outer, end);
    let (ix1, iy1) = geo.point(geo.inner, end);
    let (ix0, iy0) = geo.point(geo.inner, start);
    format!(
        "M {ox0:.3} {oy0:.3} A {r:.3} {r:.3} 0 {large} 1 {ox1:.3} {oy1:.3} \
         L {ix1:.3} {iy1:.3} A {ri:.3} {ri:.3} 0 {large} 0 {ix0:.3} {iy0:.3} Z",
        r = geo.outer,
        ri = geo.inner
    )
}

/// Full ring as two circles; draw with `fill-rule="evenodd"`.
fn ring_path(geo: &RingGeometry) -> String {
    let circle = |r: f64| {
        format!(
            "M {x0:.3} {y:.3} A {r:.3} {r:.3} 0 1 1 {x1:.3} {y:.3} A {r:.3} {r:.3} 0 1 1 {x0:.3} {y:.3} Z",
            x0 = geo.cx - r,
            x1 = geo.cx + r,
            y = geo.cy
        )
    };
    format!("{} {}", circle(geo.outer), circle(geo.inner))
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
