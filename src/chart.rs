use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Status};
use crate::categories::{CategoryMap, Collection};
use crate::format::{bucket_label, format_count};
use crate::histogram::{totals, HistogramRow};
use crate::time_range::TimeRange;

/// One bar group: axis label plus a bar height per category.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartGroup {
    pub label: String,
    pub bars: Vec<(String, u64)>,
}

/// Bars can't show NaN or negatives; those become 0.
fn bar_height(v: f64) -> u64 {
    if v.is_finite() && v > 0.0 {
        v.round() as u64
    } else {
        0
    }
}

pub fn chart_data(
    rows: &[HistogramRow],
    categories: &[String],
    range: TimeRange,
) -> Vec<ChartGroup> {
    rows.iter()
        .map(|row| ChartGroup {
            label: bucket_label(row.timestamp(), range),
            bars: categories
                .iter()
                .map(|c| (c.clone(), bar_height(row.get(c).unwrap_or(0.0))))
                .collect(),
        })
        .collect()
}

/// Plain-text table with a totals line.
pub fn render_table(rows: &[HistogramRow], categories: &[String], range: TimeRange) -> String {
    let labels: Vec<String> = rows.iter().map(|r| bucket_label(r.timestamp(), range)).collect();
    let first_w = labels
        .iter()
        .map(|l| l.chars().count())
        .chain(["timestamp".len(), "total".len()])
        .max()
        .unwrap_or(0);
    let col_w: Vec<usize> = categories.iter().map(|c| c.chars().count().max(8)).collect();

    let mut out = String::new();
    let mut push_line = |first: &str, cells: &[String]| {
        out.push_str(&format!("{first:<first_w$}"));
        for (cell, &w) in cells.iter().zip(&col_w) {
            out.push_str(&format!("  {cell:>w$}"));
        }
        out.push('\n');
    };

    push_line("timestamp", categories);
    for (row, label) in rows.iter().zip(&labels) {
        let cells: Vec<String> = categories
            .iter()
            .map(|c| format_count(row.get(c).unwrap_or(0.0)))
            .collect();
        push_line(label.as_str(), &cells);
    }
    let sums: Vec<String> = totals(rows, categories)
        .into_iter()
        .map(|(_, v)| format_count(v))
        .collect();
    push_line("total", &sums);
    out
}

/// `Category: Tag Name, Tag Name` per category, for reading the table.
pub fn render_key(map: &CategoryMap) -> String {
    let width = map.categories().iter().map(|c| c.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for category in map.categories() {
        let names = map.nicenames_in(category);
        let label = format!("{category}:");
        if names.is_empty() {
            out.push_str(&format!("{label:<w$}  (all buckets)\n", w = width + 1));
        } else {
            out.push_str(&format!("{label:<w$}  {}\n", names.join(", "), w = width + 1));
        }
    }
    out
}

// ===============================
// Top-level draw
// ===============================
pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // tabs
            Constraint::Min(0),    // chart
            Constraint::Length(3), // legend
            Constraint::Length(1), // footer
        ])
        .split(f.area());

    header(f, chunks[0], app);
    chart(f, chunks[1], app);
    legend(f, chunks[2], app);
    footer(f, chunks[3], app);
}

fn header(f: &mut Frame, area: Rect, app: &App) {
    let colors = app.colors();
    let mut spans = Vec::new();
    for (i, c) in Collection::ALL.iter().enumerate() {
        spans.push(Span::raw(if i == 0 { "┌─" } else { "┬─" }));
        let title = format!("{} {}", i + 1, c.title());
        if *c == app.collection() {
            spans.push(Span::styled(
                title,
                Style::default().fg(colors.focus_border).add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::raw(title));
        }
        spans.push(Span::raw("─"));
    }
    spans.push(Span::raw("┐  "));
    spans.push(Span::styled(
        format!("range: {}", app.range()),
        Style::default().fg(colors.text_dim),
    ));

    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::BOTTOM).border_type(BorderType::Plain));
    f.render_widget(paragraph, area);
}

fn chart(f: &mut Frame, area: Rect, app: &App) {
    let colors = app.colors();
    let map = app.category_map();
    let categories = map.categories();

    let block = Block::default()
        .title(format!(" {} · last {} ", app.collection().title(), app.range()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(colors.focus_border));

    let groups = chart_data(app.rows(), categories, app.range());
    if groups.is_empty() {
        let msg = match app.status() {
            Status::Loading => "Loading…",
            Status::Error(_) => "No data (fetch failed)",
            Status::Ready { .. } => "No buckets in this range",
        };
        f.render_widget(
            Paragraph::new(msg)
                .style(Style::default().fg(colors.text_dim))
                .block(block),
            area,
        );
        return;
    }

    // A group needs one column per bar plus the gap; keep the newest that fit
    let per_group = u16::try_from(categories.len()).unwrap_or(u16::MAX).max(1);
    let inner_w = area.width.saturating_sub(2);
    let capacity = usize::from(inner_w / per_group.saturating_add(1)).max(1);
    let groups = &groups[groups.len().saturating_sub(capacity)..];
    let slot = inner_w / u16::try_from(groups.len()).unwrap_or(u16::MAX).max(1);
    let bar_width = (slot.saturating_sub(1) / per_group).clamp(1, 5);

    let mut widget = BarChart::default()
        .block(block)
        .bar_width(bar_width)
        .bar_gap(0)
        .group_gap(1)
        .label_style(Style::default().fg(colors.text_dim))
        .value_style(Style::default().fg(colors.background).add_modifier(Modifier::BOLD));

    for g in groups {
        let bars: Vec<Bar> = g
            .bars
            .iter()
            .map(|(category, value)| {
                let color = colors.category_color(app.theme(), map.color_of(category));
                let text = if bar_width >= 3 {
                    format_count(*value as f64)
                } else {
                    String::new()
                };
                Bar::default()
                    .value(*value)
                    .text_value(text)
                    .style(Style::default().fg(color))
            })
            .collect();
        widget = widget.data(BarGroup::default().label(Line::from(g.label.clone())).bars(&bars));
    }

    f.render_widget(widget, area);
}

fn legend(f: &mut Frame, area: Rect, app: &App) {
    let colors = app.colors();
    let map = app.category_map();

    let mut spans = Vec::new();
    for (category, total) in totals(app.rows(), map.categories()) {
        let color = colors.category_color(app.theme(), map.color_of(&category));
        spans.push(Span::styled("■ ", Style::default().fg(color)));
        spans.push(Span::styled(
            format!("{category}: {}   ", format_count(total)),
            Style::default().fg(colors.text),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(" Legend ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(colors.unfocused_border)),
    );
    f.render_widget(paragraph, area);
}

fn footer(f: &mut Frame, area: Rect, app: &App) {
    let colors = app.colors();
    let (status, color) = match app.status() {
        Status::Loading => ("loading".to_string(), colors.text_dim),
        Status::Ready { at } => (
            format!("updated {}", at.format("%H:%M:%S")),
            colors.status_ok,
        ),
        Status::Error(e) => (format!("error: {e}"), colors.status_error),
    };

    let line = Line::from(vec![
        Span::styled(status, Style::default().fg(color)),
        Span::styled(
            "  │ q quit · r refresh · c/Tab collection · t range · 1-5 jump",
            Style::default().fg(colors.text_dim),
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}
