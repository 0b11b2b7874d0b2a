use super::{Tone, title};
use crate::chart::ChartBuffer;
use crate::models::TradingMode;
use ratatui::{
    Frame,
    layout::Rect,
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
};

/// (seconds since the oldest sample, spread) for every buffered sample.
pub fn chart_points(buffer: &ChartBuffer) -> Vec<(f64, f64)> {
    let Some(origin) = buffer.iter().next().map(|p| p.timestamp) else {
        return Vec::new();
    };
    buffer
        .iter()
        .map(|p| (p.timestamp.saturating_sub(origin) as f64 / 1000.0, p.spread))
        .collect()
}

pub fn stats_line(buffer: &ChartBuffer) -> Line<'static> {
    let Some(latest) = buffer.latest() else {
        return Line::from(format!("points 0 ({})", buffer.window_label()));
    };
    let tone = Tone::of(latest.spread).style();
    Line::from(vec![
        Span::raw(format!(" points {} ({})   latest ", buffer.len(), buffer.window_label())),
        Span::styled(format!("{:.6}", latest.spread), tone),
        Span::raw("   pct "),
        Span::styled(format!("{:.3}% ", latest.spread_percentage), tone),
    ])
}

pub fn render(frame: &mut Frame, area: Rect, buffer: &ChartBuffer, mode: TradingMode) {
    let block = Block::default()
        .title(title(format!("spread chart ({})", mode.display_name())))
        .borders(Borders::ALL);

    let Some(latest) = buffer.latest() else {
        let waiting = Paragraph::new(Line::styled("waiting for data...", Tone::Neutral.style()));
        frame.render_widget(waiting.block(block), area);
        return;
    };

    let points = chart_points(buffer);
    let x_max = points.last().map(|p| p.0).unwrap_or(0.0).max(1.0);
    let (lo, hi) = buffer.y_domain();
    let zero = [(0.0, 0.0), (x_max, 0.0)];

    let mut datasets = Vec::new();
    if lo <= 0.0 && hi >= 0.0 {
        datasets.push(
            Dataset::default()
                .marker(Marker::Dot)
                .graph_type(GraphType::Line)
                .style(Tone::Neutral.style())
                .data(&zero),
        );
    }
    datasets.push(
        Dataset::default()
            .name("spread")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Tone::of(latest.spread).style())
            .data(&points),
    );

    let first_time = buffer.iter().next().map(|p| p.time.clone()).unwrap_or_default();
    let x_axis = Axis::default()
        .title("time")
        .bounds([0.0, x_max])
        .labels(vec![Span::raw(first_time), Span::raw(latest.time.clone())]);
    let y_axis = Axis::default()
        .title("spread")
        .bounds([lo, hi])
        .labels(vec![Span::raw(format!("{lo:.6}")), Span::raw(format!("{hi:.6}"))]);

    let chart = Chart::new(datasets)
        .block(block.title_bottom(stats_line(buffer)))
        .x_axis(x_axis)
        .y_axis(y_axis);
    frame.render_widget(chart, area);
}
