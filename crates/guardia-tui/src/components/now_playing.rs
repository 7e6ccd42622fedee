//! Now-playing header: 3 rows, not focusable.
//!
//! Row 1: program title, current episode and player status.
//! Row 2: seek bar with position / duration.
//! Row 3: volume, mute, rate, and the last playback error if any.

use guardia_core::catalog::format_duration;
use guardia_core::player::{PlaybackSession, PlayerStatus};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{
    app_state::AppState,
    theme::{style_secondary, C_ACCENT, C_ERROR, C_LOADING, C_MUTED, C_PLAYING, C_PRIMARY, C_SECONDARY},
    widgets::progress_bar::draw_progress,
};

fn status_color(status: PlayerStatus) -> Color {
    match status {
        PlayerStatus::Playing => C_PLAYING,
        PlayerStatus::Loading => C_LOADING,
        PlayerStatus::Error => C_ERROR,
        PlayerStatus::Paused => C_SECONDARY,
        PlayerStatus::Idle => C_MUTED,
    }
}

fn levels_line(session: &PlaybackSession) -> String {
    let volume = (session.volume * 100.0).round() as u32;
    let mut out = if session.muted {
        format!(" vol {}% (muted)", volume)
    } else {
        format!(" vol {}%", volume)
    };
    if (session.playback_rate - 1.0).abs() > f64::EPSILON {
        out.push_str(&format!("  ·  {:.2}x", session.playback_rate));
    }
    out
}

pub fn draw(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let session = &state.session;
    let program = state.catalog.config();

    let mut title = vec![Span::styled(
        format!(" {} ", program.title),
        Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
    )];
    match &session.current_episode {
        Some(ep) => {
            title.push(Span::styled(
                format!("[{}] ", session.status.label()),
                Style::default().fg(status_color(session.status)),
            ));
            title.push(Span::styled(ep.title.clone(), Style::default().fg(C_PRIMARY)));
            if session.buffering {
                title.push(Span::styled("  buffering…", Style::default().fg(C_LOADING)));
            }
        }
        None => {
            let stats = state.catalog.stats();
            let summary = if state.catalog.is_loading() {
                "loading catalog…".to_string()
            } else {
                format!(
                    "{} episodes · {} total",
                    stats.total_episodes,
                    format_duration(stats.total_seconds)
                )
            };
            title.push(Span::styled(summary, style_secondary()));
        }
    }
    frame.render_widget(Paragraph::new(Line::from(title)), rows[0]);

    if session.current_episode.is_some() {
        draw_progress(frame, rows[1], session.position, session.duration, session.buffering);
    }

    let mut bottom = vec![Span::styled(levels_line(session), style_secondary())];
    if let Some(err) = &session.error {
        bottom.push(Span::styled(format!("  {}", err), Style::default().fg(C_ERROR)));
    }
    frame.render_widget(Paragraph::new(Line::from(bottom)), rows[2]);
}
