//! Component trait: the interface every focusable pane implements.
//!
//! Components own their own view state (selection, scroll), read everything
//! else from `AppState`, and never mutate shared state: they return
//! `Action`s and the App applies them.

use ratatui::crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use crate::action::{Action, ComponentId};
use crate::app_state::AppState;

pub trait Component {
    fn id(&self) -> ComponentId;

    /// Only called while this component has focus and no global binding
    /// claimed the key.
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action>;

    /// Called after every state change so view state can follow the data.
    fn sync(&mut self, _state: &AppState) {}

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState);
}
