use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum InputEvent {
    PointerDown { column: u16, row: u16 },
    Resize,
    Quit,
}

pub(crate) fn collect_input_nonblocking(max_frame_time: Duration) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        if let Some(ev) = map_event(event::read()?) {
            out.push(ev);
            if out.len() >= 32 {
                break;
            }
        }
    }
    Ok(out)
}

pub(crate) fn map_event(ev: Event) -> Option<InputEvent> {
    match ev {
        Event::Key(k) => {
            if k.kind != KeyEventKind::Press {
                return None;
            }
            match k.code {
                KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => {
                    Some(InputEvent::Quit)
                }
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(InputEvent::Quit),
                _ => None,
            }
        }
        // any button, like a DOM pointerdown
        Event::Mouse(m) => match m.kind {
            MouseEventKind::Down(_) => Some(InputEvent::PointerDown {
                column: m.column,
                row: m.row,
            }),
            _ => None,
        },
        Event::Resize(_, _) => Some(InputEvent::Resize),
        _ => None,
    }
}
