//! Terminal rendering of messages.

use askdata_chat::view::{self, Presentation};
use askdata_chat::{
    format_table_data, ChartData, ChartType, Message, MessageBody, MessageRole, Notification,
    Notifier, QueryInfo, TableData,
};

/// Widest bar drawn for a chart value.
const BAR_WIDTH: usize = 40;

/// Prints notifications to stderr.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        eprintln!("❌ {}: {}", notification.title, notification.description);
    }
}

/// Render one message for the terminal.
pub fn render_message(message: &Message) -> String {
    let mut out = String::new();

    match message.role {
        MessageRole::User => {
            out.push_str(&format!(
                "[#{}] ❓ {}",
                message.id,
                message.content.as_deref().unwrap_or_default()
            ));
            return out;
        }
        MessageRole::Assistant => {
            out.push_str(&format!(
                "[#{}] ✅ {}",
                message.id,
                message.content.as_deref().unwrap_or_default()
            ));
        }
    }

    if let Some(info) = &message.query {
        out.push_str(&render_query_info(info));
    }

    match &message.body {
        MessageBody::Text => {}
        MessageBody::Table(table) => {
            out.push('\n');
            out.push_str(&render_table(table));
        }
        MessageBody::Chart(payload) => {
            out.push('\n');
            out.push_str(&render_chart(payload.chart_type, &payload.chart_data));
        }
    }

    out
}

fn render_query_info(info: &QueryInfo) -> String {
    let mut out = String::new();
    if let Some(sql) = &info.sql {
        out.push_str(&format!("\n   SQL: {}", sql));
    }
    if let Some(count) = info.count {
        out.push_str(&format!("\n   Rows: {}", count));
    }
    if let Some(ms) = info.execution_time_ms {
        out.push_str(&format!("\n   Execution: {} ms", ms));
    }
    out
}

/// Render a table message in its current view.
pub fn render_table(table: &TableData) -> String {
    let mut out = match view::resolve(table) {
        Presentation::Table => format_table_data(table),
        Presentation::Chart { chart_type, data } => render_chart(chart_type, &data),
    };

    if view::is_chartable(table) {
        let selection = view::effective_selection(table);
        out.push_str(&format!(
            "\n   view: {}  series: {}  numeric: {}",
            table.view_mode,
            selection.join(", "),
            view::numeric_columns(table).join(", ")
        ));
    } else if table.view_mode.chart_type().is_some() {
        out.push_str("\n   ⚠️  Nothing to plot, showing table");
    }
    out
}

/// Render chart series as text.
pub fn render_chart(chart_type: ChartType, data: &ChartData) -> String {
    match chart_type {
        ChartType::Pie => render_pie(data),
        ChartType::Bar => render_bars(data, '█'),
        ChartType::Line => render_bars(data, '·'),
    }
}

fn render_bars(data: &ChartData, mark: char) -> String {
    let label_width = data.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let mut sections = Vec::new();

    for dataset in &data.datasets {
        let max = dataset
            .data
            .iter()
            .fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let mut lines = vec![format!("{}:", dataset.label)];

        for (label, value) in data.labels.iter().zip(&dataset.data) {
            let len = if max > 0.0 {
                ((value.abs() / max) * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            let bar: String = if mark == '█' {
                std::iter::repeat(mark).take(len).collect()
            } else {
                format!("{}{}", " ".repeat(len.saturating_sub(1)), mark)
            };
            lines.push(format!(
                "  {:<width$} │{} {}",
                label,
                bar,
                format_value(*value),
                width = label_width
            ));
        }
        sections.push(lines.join("\n"));
    }

    sections.join("\n")
}

fn render_pie(data: &ChartData) -> String {
    let slices = data.pie_slices();
    let total: f64 = slices.iter().map(|(_, v)| v.abs()).sum();
    let label_width = slices.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let series = data
        .datasets
        .first()
        .map(|d| d.label.as_str())
        .unwrap_or_default();

    let mut lines = vec![format!("{} (share):", series)];
    for (label, value) in slices {
        let share = if total > 0.0 { value.abs() / total * 100.0 } else { 0.0 };
        lines.push(format!(
            "  {:<width$} {:>5.1}%  {}",
            label,
            share,
            format_value(value),
            width = label_width
        ));
    }
    lines.join("\n")
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}
