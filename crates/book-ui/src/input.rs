//! Input binding
//!
//! Raw egui input is first reduced to `Gesture`s, then bound to book
//! operations. Only the first step touches egui state, which keeps the
//! binding rules testable.

use egui::{Event, InputState, Key, TouchPhase};

/// Something the reader did this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Primary button click anywhere in the window
    Click,
    /// A finger landed anywhere in the window
    TouchStart,
    /// A key went down
    Key(Key),
}

/// Book operation requested by the reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookInput {
    Advance,
    Retreat,
}

/// Collect this frame's gestures from egui input
pub fn gestures(input: &InputState) -> Vec<Gesture> {
    let mut out = Vec::new();

    for event in &input.events {
        if let Event::Touch { phase: TouchPhase::Start, .. } = event {
            out.push(Gesture::TouchStart);
        }
    }

    if input.pointer.primary_clicked() {
        out.push(Gesture::Click);
    }

    for key in [Key::ArrowRight, Key::ArrowLeft] {
        if input.key_pressed(key) {
            out.push(Gesture::Key(key));
        }
    }

    out
}

/// Map gestures to book operations, in order.
///
/// A touch and the click egui synthesises from it arrive in the same
/// frame and advance once.
pub fn bind(gestures: &[Gesture]) -> Vec<BookInput> {
    let touched = gestures.contains(&Gesture::TouchStart);

    gestures
        .iter()
        .filter_map(|gesture| match gesture {
            Gesture::TouchStart => Some(BookInput::Advance),
            Gesture::Click if touched => None,
            Gesture::Click => Some(BookInput::Advance),
            Gesture::Key(Key::ArrowRight) => Some(BookInput::Advance),
            Gesture::Key(Key::ArrowLeft) => Some(BookInput::Retreat),
            Gesture::Key(_) => None,
        })
        .collect()
}
