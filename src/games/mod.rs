/// Game trait and top-level app state.

pub mod battle;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::input::{ClickState, InputEvent};

/// Trait that all games implement.
pub trait Game {
    /// Handle an input event. Returns true if the event was consumed.
    fn handle_input(&mut self, event: &InputEvent) -> bool;

    /// Advance game logic by `delta_ticks` discrete ticks.
    fn tick(&mut self, delta_ticks: u32);

    /// Render the game into the given area.
    fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>);
}

/// Top-level application state.
pub enum AppState {
    /// Home screen with the start button.
    Home,
    /// Playing the quiz.
    Playing { game: Box<dyn Game> },
}

pub fn create_game() -> Box<dyn Game> {
    Box::new(battle::BattleGame::new())
}
