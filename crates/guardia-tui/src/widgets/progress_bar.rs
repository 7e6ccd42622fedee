//! Smooth Unicode progress bar for the transport line.

use guardia_core::catalog::format_duration;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::{C_LOADING, C_MUTED, C_PLAYING, C_SECONDARY};

const BLOCKS: [char; 9] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

/// Fill `width` cells for `progress` (0.0..=1.0) at eighth-cell resolution.
fn bar_cells(progress: f64, width: usize) -> String {
    let eighths = (progress.clamp(0.0, 1.0) * width as f64 * 8.0) as usize;
    let full = eighths / 8;
    let mut bar = String::with_capacity(width * 3);
    bar.extend(std::iter::repeat('█').take(full));
    if full < width {
        bar.push(BLOCKS[eighths % 8]);
        bar.extend(std::iter::repeat(' ').take(width - full - 1));
    }
    bar
}

/// `position / duration` labels either side of the bar.  The bar turns amber
/// while the backend is buffering.
pub fn draw_progress(frame: &mut Frame, area: Rect, position: f64, duration: f64, buffering: bool) {
    if area.width < 4 || area.height == 0 {
        return;
    }
    let left = format_duration(position.max(0.0) as u64);
    let right = if duration > 0.0 {
        format_duration(duration as u64)
    } else {
        "--:--".to_string()
    };
    let label_w = (left.len() + right.len() + 2) as u16;
    let bar_w = area.width.saturating_sub(label_w).max(4) as usize;
    let progress = if duration > 0.0 { position / duration } else { 0.0 };
    let color = if buffering { C_LOADING } else { C_PLAYING };

    let line = Line::from(vec![
        Span::styled(format!("{} ", left), Style::default().fg(C_SECONDARY)),
        Span::styled(bar_cells(progress, bar_w), Style::default().fg(color)),
        Span::styled(format!(" {}", right), Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_cells_width_is_constant() {
        for p in [0.0, 0.13, 0.5, 0.999, 1.0, 2.0, -1.0] {
            assert_eq!(bar_cells(p, 10).chars().count(), 10, "progress {}", p);
        }
    }

    #[test]
    fn test_bar_cells_fill() {
        assert_eq!(bar_cells(0.0, 4), "    ");
        assert_eq!(bar_cells(1.0, 4), "████");
        assert_eq!(bar_cells(0.5, 4), "██  ");
        assert_eq!(bar_cells(0.25, 2), "▌ ");
    }
}
