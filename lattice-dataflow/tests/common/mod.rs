//! A stand-in renderer for scenario tests.
//!
//! The UI functions under test "draw" into a [`Frame`]: text lines, input
//! boxes and buttons. Tests then read the frame the way a user reads the
//! screen and click buttons by label.

#![allow(dead_code)]

use std::sync::Arc;

use lattice_dataflow::signal::Value;
use lattice_dataflow::{Action, Context, DispatchError, EventId, Signal, System};
use parking_lot::Mutex;

pub type Shared<T> = Arc<Mutex<T>>;

pub struct Frame<T: Value> {
    pub texts: Vec<String>,
    pub buttons: Vec<(String, EventId)>,
    pub inputs: Vec<Signal<T>>,
}

impl<T: Value> Default for Frame<T> {
    fn default() -> Self {
        Self {
            texts: Vec::new(),
            buttons: Vec::new(),
            inputs: Vec::new(),
        }
    }
}

impl<T: Value> Frame<T> {
    pub fn event(&self, label: &str) -> EventId {
        self.buttons
            .iter()
            .find(|(text, _)| text == label)
            .map(|(_, id)| id.clone())
            .unwrap_or_else(|| panic!("no button labelled {label:?}"))
    }

    pub fn has_button(&self, label: &str) -> bool {
        self.buttons.iter().any(|(text, _)| text == label)
    }

    pub fn shows(&self, text: &str) -> bool {
        self.texts.iter().any(|line| line == text)
    }
}

pub fn frame<T: Value>() -> Shared<Frame<T>> {
    Arc::new(Mutex::new(Frame::default()))
}

/// Forget what the previous traversal drew.
pub fn clear<T: Value>(frame: &Shared<Frame<T>>) {
    let mut frame = frame.lock();
    frame.texts.clear();
    frame.buttons.clear();
    frame.inputs.clear();
}

/// A text line. Empty content draws a blank line.
pub fn text<T: Value>(frame: &Shared<Frame<T>>, content: Option<String>) {
    frame.lock().texts.push(content.unwrap_or_default());
}

pub fn input<T: Value>(frame: &Shared<Frame<T>>, signal: &Signal<T>) {
    frame.lock().inputs.push(signal.clone());
}

pub fn button<T: Value>(
    ctx: &mut Context<'_>,
    frame: &Shared<Frame<T>>,
    label: impl Into<String>,
    action: &Action,
) {
    let id = ctx.on_event(action);
    frame.lock().buttons.push((label.into(), id));
}

/// Click the button labelled `label` in the last frame.
pub fn click<T: Value>(
    system: &mut System,
    frame: &Shared<Frame<T>>,
    label: &str,
) -> Result<(), DispatchError> {
    let event = frame.lock().event(label);
    system.dispatch(&event)
}

/// Type `value` into the `index`-th input box, then let the host refresh.
pub fn type_into<T: Value>(system: &mut System, frame: &Shared<Frame<T>>, index: usize, value: T) {
    let input = frame.lock().inputs[index].clone();
    input.write(value);
    system.refresh_if_needed();
}

/// Empty the `index`-th input box, then let the host refresh.
pub fn erase<T: Value>(system: &mut System, frame: &Shared<Frame<T>>, index: usize) {
    let input = frame.lock().inputs[index].clone();
    input.clear();
    system.refresh_if_needed();
}
