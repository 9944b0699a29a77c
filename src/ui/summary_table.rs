use flashdrill::summary::RunSummary;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};
use unicode_width::UnicodeWidthStr;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

/// Post-drill screen: totals, the occurrence table, and key hints
pub fn render_summary(summary: &RunSummary, status: Option<&str>, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(1), // totals
            Constraint::Length(1), // padding
            Constraint::Min(3),    // table
            Constraint::Length(1), // status
            Constraint::Length(1), // legend
        ])
        .split(area);

    let title = if summary.stopped_early {
        Span::styled("DRILL STOPPED", bold_style.fg(Color::Yellow))
    } else {
        Span::styled("DRILL COMPLETE", bold_style.fg(Color::Green))
    };
    Paragraph::new(Line::from(title))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let totals = format!(
        "{} reps · {} · {}",
        summary.total_reps,
        summary.elapsed_label(),
        summary.difficulty
    );
    Paragraph::new(Span::styled(totals, bold_style))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let header = Row::new(summary.headers.iter().map(|h| Cell::from(*h))).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );
    let rows: Vec<Row> = summary
        .rows_by_count()
        .into_iter()
        .map(|row| Row::new(vec![Cell::from(row.label.clone()), Cell::from(row.count.to_string())]))
        .collect();

    if rows.is_empty() {
        Paragraph::new(Span::styled("nothing was shown", dim_style))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);
    } else {
        let label_width = summary
            .rows
            .iter()
            .map(|row| row.label.width())
            .chain(std::iter::once(summary.headers[0].width()))
            .max()
            .unwrap_or(0) as u16;
        Table::new(rows, [Constraint::Length(label_width + 4), Constraint::Min(5)])
            .header(header)
            .block(Block::default().borders(Borders::TOP))
            .render(chunks[3], buf);
    }

    if let Some(status) = status {
        Paragraph::new(Span::styled(status.to_string(), dim_style))
            .alignment(Alignment::Center)
            .render(chunks[4], buf);
    }

    Paragraph::new(Span::styled(
        "(r)estart / (e)xport csv / (q)uit",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[5], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashdrill::program::Difficulty;
    use flashdrill::summary::ProgressRow;

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut out = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn summary(rows: Vec<ProgressRow>) -> RunSummary {
        RunSummary {
            total_reps: rows.iter().map(|r| r.count).sum(),
            total_secs: 65,
            emitted: 3,
            headers: ["Problem", "Count"],
            rows,
            difficulty: Difficulty::Intermediate,
            stopped_early: false,
        }
    }

    #[test]
    fn renders_headers_and_rows() {
        let area = Rect::new(0, 0, 60, 14);
        let mut buf = Buffer::empty(area);
        let summary = summary(vec![
            ProgressRow {
                label: "1 + 2".into(),
                count: 1,
            },
            ProgressRow {
                label: "4 / 2".into(),
                count: 2,
            },
        ]);
        render_summary(&summary, Some("exported"), area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("DRILL COMPLETE"));
        assert!(text.contains("3 reps"));
        assert!(text.contains("01:05"));
        assert!(text.contains("Problem"));
        assert!(text.contains("4 / 2"));
        assert!(text.contains("exported"));
        assert!(text.find("4 / 2") < text.find("1 + 2"));
    }

    #[test]
    fn empty_table_says_so() {
        let area = Rect::new(0, 0, 60, 12);
        let mut buf = Buffer::empty(area);
        let mut summary = summary(Vec::new());
        summary.stopped_early = true;
        render_summary(&summary, None, area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("DRILL STOPPED"));
        assert!(text.contains("nothing was shown"));
    }
}
