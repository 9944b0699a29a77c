use flashdrill::engine::Frame as StimulusFrame;
use flashdrill::program::{hex_to_rgb, Shape};
use flashdrill::stimulus::Stimulus;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

pub fn hex_color(hexcode: &str) -> Color {
    hex_to_rgb(hexcode).map_or(Color::White, |(r, g, b)| Color::Rgb(r, g, b))
}

/// Whether `(u, v)` lies inside `shape`. Both axes span [-1, 1] and `v`
/// grows downwards, so the triangle points up.
pub fn shape_contains(shape: Shape, u: f64, v: f64) -> bool {
    if u.abs() > 1.0 || v.abs() > 1.0 {
        return false;
    }
    match shape {
        Shape::Square => true,
        Shape::Circle => u * u + v * v <= 1.0,
        Shape::Diamond => u.abs() + v.abs() <= 1.0,
        Shape::Triangle => u.abs() <= (v + 1.0) / 2.0,
    }
}

/// Largest centered rect that looks square; a cell is about twice as tall as wide
pub fn square_area(area: Rect) -> Rect {
    let height = area.height.min(area.width / 2);
    let width = height * 2;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_shape(shape: Shape, area: Rect, buf: &mut Buffer) {
    let canvas = square_area(area);
    if canvas.width == 0 || canvas.height == 0 {
        return;
    }
    let fill = hex_color(shape.fill_hexcode());

    for row in 0..canvas.height {
        for col in 0..canvas.width {
            let u = (col as f64 + 0.5) / canvas.width as f64 * 2.0 - 1.0;
            let v = (row as f64 + 0.5) / canvas.height as f64 * 2.0 - 1.0;
            if shape_contains(shape, u, v) {
                if let Some(cell) = buf.cell_mut((canvas.x + col, canvas.y + row)) {
                    cell.set_bg(fill);
                }
            }
        }
    }
}

fn render_centered(line: Line, area: Rect, buf: &mut Buffer) {
    if area.height == 0 {
        return;
    }
    let middle = Rect {
        y: area.y + area.height / 2,
        height: 1,
        ..area
    };
    Paragraph::new(line)
        .alignment(Alignment::Center)
        .render(middle, buf);
}

fn render_stimulus(stimulus: &Stimulus, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    match stimulus {
        Stimulus::Shape(shape) => render_shape(*shape, area, buf),
        Stimulus::Color(color) => {
            buf.set_style(area, Style::default().bg(hex_color(&color.hexcode)));
        }
        Stimulus::ShapeGroup(shapes) => {
            let spans: Vec<Span> = shapes
                .iter()
                .enumerate()
                .flat_map(|(i, shape)| {
                    let glyph = Span::styled(
                        shape.glyph().to_string(),
                        bold_style.fg(hex_color(shape.fill_hexcode())),
                    );
                    let gap = (i > 0).then(|| Span::raw("  "));
                    gap.into_iter().chain(std::iter::once(glyph))
                })
                .collect();
            render_centered(Line::from(spans), area, buf);
        }
        Stimulus::Letter(_) | Stimulus::Number(_) | Stimulus::Math(_) => {
            render_centered(
                Line::from(Span::styled(stimulus.to_string(), bold_style)),
                area,
                buf,
            );
        }
    }
}

/// Paint whatever the engine is presenting into `area`
pub fn render_frame(frame: StimulusFrame, area: Rect, buf: &mut Buffer) {
    match frame {
        StimulusFrame::Blank => buf.set_style(area, Style::default().bg(Color::White)),
        StimulusFrame::Empty => {}
        StimulusFrame::Showing(stimulus) => render_stimulus(stimulus, area, buf),
    }
}
