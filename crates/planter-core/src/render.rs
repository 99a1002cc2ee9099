use std::io::{self, Write};

use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use crate::calendar::{AXIS_END_DAY, month_abbr, month_midpoints};
use crate::details::{PLACEHOLDER, detail_lines};
use crate::plant::PlantRecord;
use crate::schema::{ActivitySchema, Category};
use crate::timeline::{Shape, Timeline};

/// Character columns spanning the day axis of the text chart.
pub const CHART_WIDTH: usize = 72;

const BAR: char = '█';
const FROST: char = '░';
const EMPTY: char = ' ';

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    #[tracing::instrument(skip(self, timeline), fields(rows = timeline.rows.len()))]
    pub fn print_chart(&self, timeline: &Timeline) -> anyhow::Result<()> {
        self.write_chart(io::stdout().lock(), timeline)
    }

    pub fn write_chart<W: Write>(&self, mut out: W, timeline: &Timeline) -> anyhow::Result<()> {
        let schema = timeline.category.schema();
        let label_width = timeline
            .rows
            .iter()
            .map(|row| UnicodeWidthStr::width(row.name.as_str()))
            .max()
            .unwrap_or(0)
            .max(UnicodeWidthStr::width("Plant"));
        let lane_width = schema
            .iter()
            .map(|spec| UnicodeWidthStr::width(spec.kind.label()))
            .max()
            .unwrap_or(0);

        writeln!(out, "{} {}", timeline.category.label(), timeline.year)?;
        writeln!(
            out,
            "{:label_width$} {:lane_width$} {}",
            "",
            "",
            month_header(timeline.year)
        )?;

        let background = frost_background(&timeline.shapes);

        for row in &timeline.rows {
            for (lane, spec) in schema.iter().enumerate() {
                let mut cells = background.clone();
                let mut color = None;
                for segment in timeline
                    .segments
                    .iter()
                    .filter(|segment| segment.row == row.row && segment.kind == spec.kind)
                {
                    for cell in &mut cells[column(segment.interval.start)..=column(segment.interval.end)] {
                        *cell = BAR;
                    }
                    color = Some(segment.color);
                }

                let name = if lane == 0 { row.name.as_str() } else { "" };
                let bar: String = cells.iter().collect();
                let bar = match color {
                    Some(color) => self.paint_bar(&bar, color),
                    None => bar,
                };
                writeln!(
                    out,
                    "{}{} {:lane_width$} {}",
                    name,
                    " ".repeat(label_width.saturating_sub(UnicodeWidthStr::width(name))),
                    spec.kind.label(),
                    bar
                )?;
            }
        }

        let legend = timeline
            .legend
            .iter()
            .map(|entry| format!("{} {}", self.paint(&BAR.to_string(), ansi_code(entry.color)), entry.label))
            .collect::<Vec<_>>()
            .join("  ");
        if !legend.is_empty() {
            writeln!(out)?;
            writeln!(out, "{legend}  {FROST} frost")?;
        }

        Ok(())
    }

    #[tracing::instrument(skip(self, rows, schema), fields(rows = rows.len()))]
    pub fn print_plant_table(&self, rows: &[&PlantRecord], schema: &ActivitySchema) -> anyhow::Result<()> {
        self.write_plant_table(io::stdout().lock(), rows, schema)
    }

    pub fn write_plant_table<W: Write>(
        &self,
        out: W,
        rows: &[&PlantRecord],
        schema: &ActivitySchema,
    ) -> anyhow::Result<()> {
        let mut headers = vec!["Row".to_string(), "Name".to_string()];
        headers.extend(schema.iter().map(|spec| spec.kind.label().to_string()));
        headers.push("Light".to_string());

        let table = rows
            .iter()
            .map(|plant| {
                let mut cells = vec![self.paint(&plant.row.to_string(), "33"), plant.name.clone()];
                cells.extend(schema.iter().map(|spec| {
                    plant
                        .month_range(spec)
                        .map(|range| {
                            format!(
                                "{}–{}",
                                month_abbr(range.start()).unwrap_or_default(),
                                month_abbr(range.end()).unwrap_or_default()
                            )
                        })
                        .unwrap_or_else(|| PLACEHOLDER.to_string())
                }));
                cells.push(plant.light().unwrap_or(PLACEHOLDER).to_string());
                cells
            })
            .collect();

        write_table(out, headers, table)
    }

    #[tracing::instrument(skip(self, plant), fields(row = plant.row))]
    pub fn print_details(&self, plant: &PlantRecord) -> anyhow::Result<()> {
        self.write_details(io::stdout().lock(), plant)
    }

    pub fn write_details<W: Write>(&self, mut out: W, plant: &PlantRecord) -> anyhow::Result<()> {
        writeln!(out, "{}", self.paint(&plant.name, "1"))?;
        writeln!(out, "{}", plant.category.label())?;

        let lines = detail_lines(plant);
        let width = lines
            .iter()
            .map(|line| UnicodeWidthStr::width(line.label))
            .max()
            .unwrap_or(0);
        for line in lines {
            let pad = width.saturating_sub(UnicodeWidthStr::width(line.label));
            writeln!(out, "  {}{}  {}", line.label, " ".repeat(pad), line.value)?;
        }
        Ok(())
    }

    pub fn print_categories(&self, exists: impl Fn(Category) -> bool) -> anyhow::Result<()> {
        let headers = vec!["Slug".to_string(), "Category".to_string(), "File".to_string()];
        let rows = Category::ALL
            .iter()
            .map(|category| {
                let file = if exists(*category) {
                    category.file_name().to_string()
                } else {
                    self.paint(&format!("{} (missing)", category.file_name()), "31")
                };
                vec![category.slug().to_string(), category.label().to_string(), file]
            })
            .collect();
        write_table(io::stdout().lock(), headers, rows)
    }

    pub fn print_lines(&self, lines: &[String]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        for line in lines {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }

    pub fn print_notice(&self, message: &str) -> anyhow::Result<()> {
        writeln!(io::stdout().lock(), "{}", self.paint(message, "33"))?;
        Ok(())
    }

    pub fn print_json<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        serde_json::to_writer_pretty(&mut out, value)?;
        writeln!(out)?;
        Ok(())
    }

    fn paint_bar(&self, bar: &str, color: &str) -> String {
        if !self.color {
            return bar.to_string();
        }
        let code = ansi_code(color);
        bar.chars()
            .map(|ch| {
                if ch == BAR {
                    format!("\x1b[{code}m{ch}\x1b[0m")
                } else {
                    ch.to_string()
                }
            })
            .collect()
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

/// Column of `day` on the text axis.
fn column(day: u32) -> usize {
    let day = day.clamp(1, AXIS_END_DAY) as usize - 1;
    (day * CHART_WIDTH / AXIS_END_DAY as usize).min(CHART_WIDTH - 1)
}

fn frost_background(shapes: &[Shape]) -> Vec<char> {
    let mut cells = vec![EMPTY; CHART_WIDTH];
    for shape in shapes {
        if let Shape::Rect { x0, x1, .. } = shape {
            for cell in &mut cells[column(*x0)..=column(*x1)] {
                *cell = FROST;
            }
        }
    }
    cells
}

fn month_header(year: i32) -> String {
    let mut header = vec![' '; CHART_WIDTH];
    for (month, midpoint) in (1..=12).zip(month_midpoints(year)) {
        let Some(abbr) = month_abbr(month) else {
            continue;
        };
        let start = column(midpoint).saturating_sub(1);
        for (offset, ch) in abbr.chars().enumerate() {
            if let Some(cell) = header.get_mut(start + offset) {
                *cell = ch;
            }
        }
    }
    header.into_iter().collect::<String>().trim_end().to_string()
}

fn ansi_code(color: &str) -> &'static str {
    match color {
        "blue" => "34",
        "darkblue" => "38;5;18",
        "limegreen" => "92",
        "olivedrab" => "38;5;64",
        "saddlebrown" => "38;5;94",
        "purple" => "35",
        "darkgreen" => "32",
        "orange" => "38;5;208",
        "red" => "31",
        _ => "90",
    }
}

fn write_table<W: Write>(mut writer: W, headers: Vec<String>, rows: Vec<Vec<String>>) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths: Vec<usize> = headers
        .iter()
        .map(|header| UnicodeWidthStr::width(header.as_str()))
        .collect();

    for row in &rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for (header, &width) in headers.iter().zip(&widths) {
        write!(writer, "{header:width$} ")?;
    }
    writeln!(writer)?;

    for &width in &widths {
        write!(writer, "{:-<width$} ", "")?;
    }
    writeln!(writer)?;

    for row in rows {
        for (cell, width) in row.iter().zip(&widths) {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = width.saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ActivityToggles;
    use crate::timeline::{SortOrder, TimelineOptions, assemble};

    fn tulip() -> PlantRecord {
        PlantRecord::new(0, "Tulip".to_string(), Category::Bulb)
            .with_field("Plant Start", "Oct")
            .with_field("Plant End", "Feb")
            .with_field("Flower Start", "Apr")
            .with_field("Flower End", "May")
            .with_field("Light", "Full Sun")
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> anyhow::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn columns_cover_the_axis() {
        assert_eq!(column(1), 0);
        assert_eq!(column(AXIS_END_DAY), CHART_WIDTH - 1);
        assert_eq!(column(0), 0);
        assert!(column(183) > CHART_WIDTH / 2 - 2);
    }

    #[test]
    fn chart_draws_wrapped_range_at_both_edges() {
        let plant = tulip();
        let timeline = assemble(
            &[&plant],
            Category::Bulb.schema(),
            &TimelineOptions {
                sort: SortOrder::NameAsc,
                visible: ActivityToggles::all(),
                year: 2025,
            },
        );
        let text = render(|buf| Renderer::plain().write_chart(buf, &timeline));

        let plant_line = text
            .lines()
            .find(|line| line.starts_with("Tulip"))
            .unwrap();
        let bar: Vec<char> = plant_line.chars().rev().take(CHART_WIDTH).collect();
        assert_eq!(bar[0], BAR);
        assert_eq!(bar[CHART_WIDTH - 1], BAR);
        assert!(text.contains("Jan"));
        assert!(text.lines().any(|line| line.trim_start().starts_with("Flower")));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn table_pads_by_visible_width() {
        let plant = tulip();
        let text = render(|buf| {
            Renderer::new(true).write_plant_table(buf, &[&plant], Category::Bulb.schema())
        });
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Row Name "));
        assert!(lines[2].contains("Oct–Feb"));
        assert!(lines[2].contains("Full Sun"));
        assert_eq!(
            UnicodeWidthStr::width(strip_ansi(lines[2]).as_str()),
            UnicodeWidthStr::width(lines[0])
        );
    }

    #[test]
    fn details_show_placeholders() {
        let text = render(|buf| Renderer::plain().write_details(buf, &tulip()));
        assert!(text.starts_with("Tulip\nBulbs Corms & Tubers\n"));
        assert!(text.contains("Light"));
        assert!(text.contains("Full Sun"));
        assert!(text.lines().any(|line| line.trim_end().ends_with(PLACEHOLDER)));
    }

    #[test]
    fn strip_ansi_removes_escape_sequences() {
        assert_eq!(strip_ansi("\x1b[38;5;208mPlant Out\x1b[0m"), "Plant Out");
    }
}
