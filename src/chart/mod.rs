//! Streamgraph rendering.
//!
//! Turns ascending per-year summaries into a standalone SVG: one stacked
//! area per group, a bottom year axis, a left count axis, a rotated axis
//! label and a legend.

pub mod curve;
pub mod scale;
pub mod stack;
pub mod svg;

pub use curve::CatmullRom;
pub use scale::LinearScale;
pub use stack::{stack, StackOffset, StackOrder};

use crate::config::{ChartConfig, Margins};
use crate::models::{Group, GroupKey, YearSummary};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use svg::{fmt_num, SvgBuilder};
use tracing::debug;

const TICK_SIZE: f64 = 6.0;
const TICK_PADDING: f64 = 3.0;
const LEGEND_SWATCH: f64 = 14.0;
const LEGEND_Y: f64 = 24.0;
const AXIS_COLOR: &str = "#453430";

/// Categorical colors, assigned by group position.
const TABLEAU10: [&str; 10] = [
    "#4e79a7", "#f28e2c", "#e15759", "#76b7b2", "#59a14f", "#edc949", "#af7aa1", "#ff9da7",
    "#9c755f", "#bab0ab",
];

/// Where layer fill colors come from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    /// Tableau 10 categorical scheme, assigned in group order.
    #[default]
    Tableau10,
    /// Each group's configured color.
    Groups,
}

impl Palette {
    pub fn color<'a>(self, group: &'a Group) -> &'a str {
        match self {
            Palette::Tableau10 => TABLEAU10[group.key.index() % TABLEAU10.len()],
            Palette::Groups => &group.color,
        }
    }
}

/// Resolved rendering options.
#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub width: f64,
    pub height: f64,
    pub margin: Margins,
    pub curve_alpha: f64,
    pub order: StackOrder,
    pub offset: StackOffset,
    pub palette: Palette,
    pub y_label: String,
    pub ticks: usize,
    pub title: String,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self::from(&ChartConfig::default())
    }
}

impl From<&ChartConfig> for ChartOptions {
    fn from(config: &ChartConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            margin: config.margin,
            curve_alpha: config.curve_alpha,
            order: config.order,
            offset: config.offset,
            palette: config.palette,
            y_label: config.y_label.clone(),
            ticks: config.ticks,
            title: "Academy Award nominees by ethnic background".to_string(),
        }
    }
}

impl ChartOptions {
    /// Horizontal scale from year to x.
    pub fn x_scale(&self, summaries: &[YearSummary]) -> LinearScale {
        let first = summaries.iter().map(|s| s.year).min().unwrap_or(0);
        let last = summaries.iter().map(|s| s.year).max().unwrap_or(0);
        LinearScale::new(
            (f64::from(first), f64::from(last)),
            (self.margin.left, self.width - self.margin.right),
        )
    }

    fn y_scale(&self, extent: (f64, f64)) -> LinearScale {
        LinearScale::new(
            extent,
            (self.height - self.margin.bottom, self.margin.top),
        )
    }
}

/// Render the streamgraph for `summaries` (ascending by year).
pub fn render_streamgraph(
    summaries: &[YearSummary],
    groups: &[Group],
    options: &ChartOptions,
) -> String {
    let mut svg = SvgBuilder::new(options.width, options.height);
    svg.title(&options.title);

    render_legend(&mut svg, groups, options);

    if summaries.is_empty() {
        svg.text(
            options.width / 2.0,
            options.height / 2.0,
            "No data",
            r#"text-anchor="middle" font-size="16" fill="currentColor""#,
        );
        return svg.build();
    }

    let keys: Vec<GroupKey> = groups.iter().map(|g| g.key).collect();
    let layers = stack(summaries, &keys, options.order, options.offset);
    let extent = stack::extent(&layers).unwrap_or((0.0, 0.0));
    debug!(
        "Stacked {} layers over {} years, extent {:?}",
        layers.len(),
        summaries.len(),
        extent
    );

    let x = options.x_scale(summaries);
    let y = options.y_scale(extent);
    let curve = CatmullRom::new(options.curve_alpha);

    // Paint bottom layer first.
    let mut painted: Vec<&stack::Layer> = layers.iter().collect();
    painted.sort_by_key(|layer| layer.rank);

    svg.open_group("stream-paths", None);
    for layer in painted {
        let Some(group) = groups.iter().find(|g| g.key == layer.key) else {
            continue;
        };
        let upper: Vec<Point> = layer
            .points
            .iter()
            .map(|p| Point::new(x.apply(f64::from(p.year)), y.apply(p.upper)))
            .collect();
        let lower: Vec<Point> = layer
            .points
            .iter()
            .map(|p| Point::new(x.apply(f64::from(p.year)), y.apply(p.lower)))
            .collect();
        svg.area(
            &format!("stream {}", group.key),
            &curve.area(&upper, &lower).to_svg(),
            options.palette.color(group),
            &group.label,
        );
    }
    svg.close_group();

    render_x_axis(&mut svg, &x, options);
    render_y_axis(&mut svg, &y, options);

    svg.text(
        options.margin.left - 150.0,
        options.margin.top - 80.0,
        &options.y_label,
        r#"fill="currentColor" transform="rotate(-90)" text-anchor="end" font-size="12""#,
    );

    svg.build()
}

fn render_legend(svg: &mut SvgBuilder, groups: &[Group], options: &ChartOptions) {
    svg.open_group(
        "legend",
        Some(format!(
            "translate({},{})",
            fmt_num(options.margin.left),
            fmt_num(LEGEND_Y)
        )),
    );
    let mut offset = 0.0;
    for group in groups {
        svg.rect(offset, 0.0, LEGEND_SWATCH, LEGEND_SWATCH, options.palette.color(group));
        svg.text(
            offset + LEGEND_SWATCH + 6.0,
            LEGEND_SWATCH - 3.0,
            &group.label,
            r#"font-size="13" fill="currentColor""#,
        );
        // Approximate label width; there is no font metrics source here.
        offset += LEGEND_SWATCH + 6.0 + group.label.chars().count() as f64 * 7.0 + 24.0;
    }
    svg.close_group();
}

fn tick_label(value: f64, step: f64) -> String {
    if step >= 1.0 || step == 0.0 {
        format!("{:.0}", value)
    } else {
        let decimals = (-step.log10() - 1e-9).ceil().max(0.0) as usize;
        format!("{:.*}", decimals, value)
    }
}

fn render_x_axis(svg: &mut SvgBuilder, x: &LinearScale, options: &ChartOptions) {
    let (r0, r1) = x.range();
    let baseline = options.height - options.margin.bottom;
    svg.open_group(
        "axis axis-x",
        Some(format!("translate(0,{})", fmt_num(baseline))),
    );
    svg.raw(format!(
        r#"<path d="M{r0},{t}V0H{r1}V{t}" fill="none" stroke="{AXIS_COLOR}"/>"#,
        r0 = fmt_num(r0),
        r1 = fmt_num(r1),
        t = TICK_SIZE
    ));
    for value in x.ticks(options.ticks) {
        // Years only: skip fractional ticks on very short spans.
        if value.fract() != 0.0 {
            continue;
        }
        let px = fmt_num(x.apply(value));
        svg.raw(format!(
            r#"<g class="tick" transform="translate({px},0)"><line y2="{t}" stroke="{AXIS_COLOR}"/><text y="{ty}" dy="0.71em" text-anchor="middle" font-size="10" fill="currentColor">{label:.0}</text></g>"#,
            t = TICK_SIZE,
            ty = TICK_SIZE + TICK_PADDING,
            label = value
        ));
    }
    svg.close_group();
}

fn render_y_axis(svg: &mut SvgBuilder, y: &LinearScale, options: &ChartOptions) {
    let (r0, r1) = y.range();
    let step = y.tick_step(options.ticks);
    svg.open_group(
        "axis axis-y",
        Some(format!("translate({},0)", fmt_num(options.margin.left))),
    );
    svg.raw(format!(
        r#"<path d="M-{t},{r0}H0V{r1}H-{t}" fill="none" stroke="{AXIS_COLOR}"/>"#,
        r0 = fmt_num(r0),
        r1 = fmt_num(r1),
        t = TICK_SIZE
    ));
    for value in y.ticks(options.ticks) {
        let py = fmt_num(y.apply(value));
        svg.raw(format!(
            r#"<g class="tick" transform="translate(0,{py})"><line x2="-{t}" stroke="{AXIS_COLOR}"/><text x="-{tx}" dy="0.32em" text-anchor="end" font-size="10" fill="currentColor">{label}</text></g>"#,
            t = TICK_SIZE,
            tx = TICK_SIZE + TICK_PADDING,
            label = tick_label(value, step)
        ));
    }
    svg.close_group();
}
