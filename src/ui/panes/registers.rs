//! Registers pane rendering
//!
//! Shows the engine registers for the current snapshot and the instruction at
//! the instruction pointer with each operand resolved against memory, the way
//! the engine would see it when executing that instruction.

use crate::interpreter::decode::{decode, Mode};
use crate::interpreter::disasm::{format_instruction, format_param};
use crate::interpreter::engine::RunStatus;
use crate::memory::AddressSpace;
use crate::snapshot::Snapshot;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// One operand of the current instruction as displayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperandView {
    pub text: String,
    /// Value read through the operand; `None` for destinations and bad addresses
    pub value: Option<i64>,
    pub is_destination: bool,
}

/// Decode the instruction at `ip` and resolve its operands
pub fn resolve_operands(
    memory: &AddressSpace,
    ip: usize,
    relative_base: i64,
) -> Option<(String, Vec<OperandView>)> {
    let instr = decode(memory.get(ip)).ok()?;
    let params: Vec<i64> = (0..instr.opcode.arity())
        .map(|i| memory.get(ip + 1 + i))
        .collect();

    let operands = params
        .iter()
        .enumerate()
        .map(|(i, &raw)| {
            let mode = instr.mode(i);
            let is_destination = instr.opcode.destination() == Some(i);
            let value = if is_destination {
                None
            } else {
                match mode {
                    Mode::Position => memory.read(raw).ok(),
                    Mode::Immediate => Some(raw),
                    Mode::Relative => relative_base
                        .checked_add(raw)
                        .and_then(|a| memory.read(a).ok()),
                }
            };
            OperandView {
                text: format_param(mode, raw),
                value,
                is_destination,
            }
        })
        .collect();

    Some((format_instruction(&instr, &params), operands))
}

fn status_label(snapshot: &Snapshot) -> (&'static str, Style) {
    if snapshot.fault.is_some() {
        return ("FAULT", Style::default().fg(DEFAULT_THEME.error));
    }
    match snapshot.status {
        RunStatus::Ready => ("ready", Style::default().fg(DEFAULT_THEME.success)),
        RunStatus::AwaitingInput => (
            "awaiting input",
            Style::default().fg(DEFAULT_THEME.secondary),
        ),
        RunStatus::Halted => ("halted", Style::default().fg(DEFAULT_THEME.comment)),
    }
}

/// Render the registers pane
pub fn render_registers_pane(frame: &mut Frame, area: Rect, snapshot: &Snapshot, is_focused: bool) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Registers ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let name_style = Style::default()
        .fg(DEFAULT_THEME.register)
        .add_modifier(Modifier::BOLD);
    let value_style = Style::default().fg(DEFAULT_THEME.number);
    let (status, status_style) = status_label(snapshot);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("ip      ", name_style),
            Span::styled(snapshot.ip.to_string(), value_style),
        ]),
        Line::from(vec![
            Span::styled("rb      ", name_style),
            Span::styled(snapshot.relative_base.to_string(), value_style),
        ]),
        Line::from(vec![
            Span::styled("step    ", name_style),
            Span::styled(snapshot.step.to_string(), value_style),
        ]),
        Line::from(vec![
            Span::styled("status  ", name_style),
            Span::styled(status, status_style.add_modifier(Modifier::BOLD)),
        ]),
        Line::from(""),
    ];

    match resolve_operands(&snapshot.memory, snapshot.ip, snapshot.relative_base) {
        Some((text, operands)) => {
            lines.push(Line::from(vec![
                Span::styled("next    ", name_style),
                Span::styled(text, Style::default().fg(DEFAULT_THEME.keyword)),
            ]));
            for (i, operand) in operands.iter().enumerate() {
                let resolved = if operand.is_destination {
                    "→ written".to_string()
                } else {
                    operand
                        .value
                        .map_or_else(|| "= ?".to_string(), |v| format!("= {}", v))
                };
                lines.push(Line::from(vec![
                    Span::styled(format!("  p{}    ", i + 1), name_style),
                    Span::styled(
                        format!("{:<12}", operand.text),
                        Style::default().fg(DEFAULT_THEME.fg),
                    ),
                    Span::styled(resolved, value_style),
                ]));
            }
        }
        None => lines.push(Line::from(Span::styled(
            format!("next    (undecodable word {})", snapshot.memory.get(snapshot.ip)),
            Style::default().fg(DEFAULT_THEME.error),
        ))),
    }

    if let Some(fault) = &snapshot.fault {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            fault.to_string(),
            Style::default()
                .fg(DEFAULT_THEME.error)
                .add_modifier(Modifier::BOLD),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
