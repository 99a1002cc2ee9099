use std::cmp::Reverse;
use std::collections::HashSet;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::calendar::{AXIS_END_DAY, month_boundaries, month_boundary, month_midpoints, month_name};
use crate::filter::ActivityToggles;
use crate::legend::{self, LegendEntry};
use crate::plant::PlantRecord;
use crate::range::DayInterval;
use crate::schema::{ActivityKind, ActivitySchema, Category};

pub const ROW_SPACING: f64 = 1.0;
pub const LANE_SPACING: f64 = 0.35;
pub const BAR_HEIGHT: f64 = 0.3;
pub const MIN_CHART_HEIGHT: u32 = 600;
pub const ROW_HEIGHT_PX: u32 = 40;
pub const GRIDLINE_COLOR: &str = "DimGray";
pub const FROST_COLOR: &str = "rgba(70, 130, 180, 0.3)";

const AXIS_FLOOR: f64 = -0.5;
const FROST_END_MONTH: u32 = 4;
const FROST_START_MONTH: u32 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    NameAsc,
    NameDesc,
    /// Latest-closing primary activity first.
    PrimaryEndDesc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineOptions {
    pub sort: SortOrder,
    /// Activity classes to draw. With nothing enabled every class is drawn.
    pub visible: ActivityToggles,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineRow {
    pub row: usize,
    pub name: String,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub row: usize,
    pub plant: String,
    pub kind: ActivityKind,
    pub y: f64,
    pub interval: DayInterval,
    pub color: &'static str,
    pub label: &'static str,
    pub rank: u16,
    pub show_legend: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Shape {
    Line {
        x: u32,
        y0: f64,
        y1: f64,
        color: &'static str,
    },
    Rect {
        x0: u32,
        x1: u32,
        y0: f64,
        y1: f64,
        fill: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub position: f64,
    pub label: String,
}

/// Everything an external renderer needs to draw one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub category: Category,
    pub year: i32,
    pub rows: Vec<TimelineRow>,
    pub segments: Vec<Segment>,
    pub legend: Vec<LegendEntry>,
    pub shapes: Vec<Shape>,
    pub x_ticks: Vec<AxisTick>,
    pub y_ticks: Vec<AxisTick>,
    pub x_range: (u32, u32),
    pub height: u32,
}

impl Timeline {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Vertical offsets of `lanes` evenly spaced lanes centred on the row line.
/// Lane 0 sits highest.
pub fn lane_offsets(lanes: usize) -> Vec<f64> {
    let centre = lanes.saturating_sub(1) as f64 / 2.0;
    (0..lanes)
        .map(|lane| LANE_SPACING * (centre - lane as f64))
        .collect()
}

/// Stable sort; ties keep their input order.
#[tracing::instrument(skip(rows, schema), fields(rows = rows.len()))]
pub fn sort_rows(rows: &mut [&PlantRecord], schema: &ActivitySchema, order: SortOrder, year: i32) {
    match order {
        SortOrder::NameAsc => rows.sort_by(|a, b| a.name.cmp(&b.name)),
        SortOrder::NameDesc => rows.sort_by(|a, b| b.name.cmp(&a.name)),
        SortOrder::PrimaryEndDesc => {
            let primary = schema.primary();
            rows.sort_by_cached_key(|plant| {
                Reverse(
                    plant
                        .month_range(primary)
                        .and_then(|range| range.end_day(year))
                        .unwrap_or(0),
                )
            });
        }
    }
}

#[tracing::instrument(skip(rows, schema), fields(category = ?schema.category, rows = rows.len()))]
pub fn assemble(rows: &[&PlantRecord], schema: &ActivitySchema, options: &TimelineOptions) -> Timeline {
    let year = options.year;
    let draw_all = !options.visible.any();

    let mut ordered = rows.to_vec();
    sort_rows(&mut ordered, schema, options.sort, year);

    let offsets = lane_offsets(schema.lane_count());
    let mut timeline_rows = Vec::with_capacity(ordered.len());
    let mut segments = Vec::new();

    for (idx, plant) in ordered.iter().enumerate() {
        let y = idx as f64 * ROW_SPACING;
        timeline_rows.push(TimelineRow {
            row: plant.row,
            name: plant.name.clone(),
            y,
        });

        for (lane, spec) in schema.iter().enumerate() {
            if !draw_all && !options.visible.enabled(spec.kind.class()) {
                continue;
            }

            let Some(range) = plant.month_range(spec) else {
                trace!(row = plant.row, kind = ?spec.kind, "no usable range; skipping activity");
                continue;
            };

            let entry = legend::resolve(schema.category, spec.kind, plant);
            for interval in range.intervals(year) {
                segments.push(Segment {
                    row: plant.row,
                    plant: plant.name.clone(),
                    kind: spec.kind,
                    y: y + offsets[lane],
                    interval,
                    color: entry.color,
                    label: entry.label,
                    rank: entry.rank,
                    show_legend: false,
                });
            }
        }
    }

    let legend = dedupe_legend(&mut segments);
    let shapes = scaffold(timeline_rows.len(), year);
    let x_ticks = month_midpoints(year)
        .into_iter()
        .zip(1..=12)
        .map(|(day, month)| AxisTick {
            position: f64::from(day),
            label: month_name(month).unwrap_or_default().to_string(),
        })
        .collect();
    let y_ticks = timeline_rows
        .iter()
        .map(|row| AxisTick {
            position: row.y,
            label: row.name.clone(),
        })
        .collect();
    let height = MIN_CHART_HEIGHT.max(ROW_HEIGHT_PX.saturating_mul(timeline_rows.len() as u32));

    debug!(
        rows = timeline_rows.len(),
        segments = segments.len(),
        legend = legend.len(),
        "assembled timeline"
    );

    Timeline {
        category: schema.category,
        year,
        rows: timeline_rows,
        segments,
        legend,
        shapes,
        x_ticks,
        y_ticks,
        x_range: (1, AXIS_END_DAY),
        height,
    }
}

/// Orders segments by legend rank and marks the first segment of each label
/// as the one that shows in the legend.
fn dedupe_legend(segments: &mut [Segment]) -> Vec<LegendEntry> {
    segments.sort_by_key(|segment| segment.rank);

    let mut seen = HashSet::new();
    let mut legend = Vec::new();
    for segment in segments.iter_mut() {
        segment.show_legend = seen.insert(segment.label);
        if segment.show_legend {
            legend.push(LegendEntry {
                label: segment.label,
                color: segment.color,
                rank: segment.rank,
            });
        }
    }
    legend
}

fn scaffold(row_count: usize, year: i32) -> Vec<Shape> {
    let top = row_count as f64 * ROW_SPACING + 1.0;

    let mut shapes: Vec<Shape> = month_boundaries(year)
        .into_iter()
        .map(|x| Shape::Line {
            x,
            y0: AXIS_FLOOR,
            y1: top,
            color: GRIDLINE_COLOR,
        })
        .collect();

    if let Some(frost_end) = month_boundary(FROST_END_MONTH, year) {
        shapes.push(Shape::Rect {
            x0: 1,
            x1: frost_end,
            y0: AXIS_FLOOR,
            y1: top,
            fill: FROST_COLOR,
        });
    }
    if let Some(frost_start) = month_boundary(FROST_START_MONTH, year) {
        shapes.push(Shape::Rect {
            x0: frost_start,
            x1: AXIS_END_DAY,
            y0: AXIS_FLOOR,
            y1: top,
            fill: FROST_COLOR,
        });
    }

    shapes
}
