//! Disassembly pane rendering
//!
//! Shows the current snapshot's memory as an instruction listing, with the
//! line at the instruction pointer highlighted and held at a fixed row while
//! stepping. The listing is re-synchronized on the instruction pointer every
//! frame, so jumps into the middle of data still land on their own line.

use crate::interpreter::disasm::{disassemble_synced, DisasmLine};
use crate::snapshot::Snapshot;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Scroll state for the listing pane
#[derive(Debug, Default)]
pub struct ListingScrollState {
    pub offset: usize,
    /// Visual row the current line is pinned to (None = center on first render)
    pub target_line_row: Option<usize>,
}

fn highlight_line(line: &DisasmLine) -> Vec<Span<'static>> {
    let words = line
        .words
        .iter()
        .map(|w| w.to_string())
        .collect::<Vec<_>>()
        .join(",");

    let mut spans = Vec::new();
    if line.is_instruction {
        let (mnemonic, operands) = line
            .text
            .split_once(' ')
            .unwrap_or((line.text.as_str(), ""));
        spans.push(Span::styled(
            format!("{:<5}", mnemonic),
            Style::default()
                .fg(DEFAULT_THEME.keyword)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!("{:<28}", operands),
            Style::default().fg(DEFAULT_THEME.fg),
        ));
    } else {
        spans.push(Span::styled(
            format!("{:<33}", line.text),
            Style::default().fg(DEFAULT_THEME.comment),
        ));
    }
    spans.push(Span::styled(
        format!("; {}", words),
        Style::default().fg(DEFAULT_THEME.comment),
    ));
    spans
}

/// Render the disassembly pane
pub fn render_listing_pane(
    frame: &mut Frame,
    area: Rect,
    snapshot: &Snapshot,
    is_focused: bool,
    scroll_state: &mut ListingScrollState,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Disassembly ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let lines = disassemble_synced(snapshot.memory.words(), snapshot.ip);
    let total_lines = lines.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    let target_row = scroll_state
        .target_line_row
        .unwrap_or(visible_height / 2)
        .min(visible_height.saturating_sub(1));
    scroll_state.target_line_row = Some(target_row);

    if let Some(current_idx) = lines.iter().position(|l| l.address == snapshot.ip) {
        scroll_state.offset = current_idx.saturating_sub(target_row);
    }
    if total_lines > visible_height {
        scroll_state.offset = scroll_state.offset.min(total_lines - visible_height);
    } else {
        scroll_state.offset = 0;
    }

    let is_fault = snapshot.fault.is_some();
    let visible_lines: Vec<Line> = lines
        .iter()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|line| {
            let is_current = line.address == snapshot.ip;
            let marker = if is_current { "▶" } else { " " };

            let (addr_style, line_style) = if is_current && is_fault {
                (
                    Style::default()
                        .fg(DEFAULT_THEME.error)
                        .add_modifier(Modifier::BOLD),
                    Some(
                        Style::default()
                            .bg(DEFAULT_THEME.error)
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    ),
                )
            } else if is_current {
                (
                    Style::default()
                        .fg(DEFAULT_THEME.secondary)
                        .add_modifier(Modifier::BOLD),
                    Some(Style::default().bg(DEFAULT_THEME.current_line_bg)),
                )
            } else {
                (Style::default().fg(DEFAULT_THEME.comment), None)
            };

            let mut spans = vec![Span::styled(
                format!("{}{:5} ", marker, line.address),
                addr_style,
            )];
            let mut content = highlight_line(line);
            if let Some(style) = line_style {
                for span in &mut content {
                    span.style = span.style.patch(style);
                }
            }
            spans.extend(content);
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(visible_lines).block(block), area);
}
