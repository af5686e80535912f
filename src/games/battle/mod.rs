//! Eco Battle Quiz: defeat monsters by answering environmental quizzes.

pub mod actions;
pub mod logic;
pub mod questions;
pub mod render;
pub mod round;
pub mod save;
pub mod state;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::games::Game;
use crate::input::{ClickState, InputEvent};

use actions::*;
use questions::QuestionBank;
use state::{QuizState, Screen, Theme, ALL_THEMES};

pub struct BattleGame {
    pub state: QuizState,
}

impl BattleGame {
    pub fn new() -> Self {
        let mut state = match QuestionBank::bundled() {
            Ok(bank) => {
                let count = bank.len();
                let mut s = QuizState::new(Some(bank));
                s.add_log(&format!("クイズ {} 問を読み込みました", count));
                s
            }
            Err(e) => {
                #[cfg(target_arch = "wasm32")]
                web_sys::console::warn_1(&format!("Eco Battle Quiz: {e}").into());
                let mut s = QuizState::new(None);
                s.add_log("クイズの読み込みに失敗しました");
                s.add_log(&e.to_string());
                s
            }
        };

        #[cfg(target_arch = "wasm32")]
        {
            state.stored_theme = save::load_theme();
            state.rng_seed ^= js_sys::Date::now() as u64;
        }

        state.add_log("ステージを選んでバトル開始！");
        Self { state }
    }

    fn choose_theme(&mut self, theme: Theme) -> bool {
        #[cfg(target_arch = "wasm32")]
        save::save_theme(theme);
        logic::select_theme(&mut self.state, theme);
        true
    }

    fn handle_click(&mut self, action_id: u16) -> bool {
        // Back: battle/result → stage select or home. Stage select lets main.rs go home.
        if action_id == crate::BACK_TO_MENU {
            return self.back();
        }

        match self.state.screen {
            Screen::StageSelect => match action_id {
                id if (THEME_BASE..THEME_BASE + ALL_THEMES.len() as u16).contains(&id) => {
                    self.choose_theme(ALL_THEMES[(id - THEME_BASE) as usize])
                }
                START_STORED => {
                    logic::start_battle(&mut self.state);
                    true
                }
                _ => false,
            },
            Screen::Battle => match action_id {
                id if (OPTION_BASE..OPTION_BASE + 10).contains(&id) => {
                    logic::answer(&mut self.state, (id - OPTION_BASE) as usize)
                }
                CONTINUE | RETRY_QUESTION => logic::continue_after_feedback(&mut self.state),
                _ => false,
            },
            Screen::Result => match action_id {
                PLAY_AGAIN => {
                    logic::start_battle(&mut self.state);
                    true
                }
                BACK_TO_STAGES => {
                    logic::return_home(&mut self.state);
                    true
                }
                _ => false,
            },
        }
    }

    fn handle_key(&mut self, key: char) -> bool {
        if key == 'q' {
            return self.back();
        }

        match self.state.screen {
            Screen::StageSelect => match key {
                '0' if self.state.stored_theme.is_some() => {
                    logic::start_battle(&mut self.state);
                    true
                }
                c @ '1'..='9' => {
                    let idx = c as usize - '1' as usize;
                    match ALL_THEMES.get(idx) {
                        Some(&theme) => self.choose_theme(theme),
                        None => false,
                    }
                }
                _ => false,
            },
            Screen::Battle => match key {
                c @ '1'..='9' => logic::answer(&mut self.state, c as usize - '1' as usize),
                '\n' | ' ' | 'r' => logic::continue_after_feedback(&mut self.state),
                _ => false,
            },
            Screen::Result => match key {
                '1' | '\n' | ' ' => {
                    logic::start_battle(&mut self.state);
                    true
                }
                '2' => {
                    logic::return_home(&mut self.state);
                    true
                }
                _ => false,
            },
        }
    }

    /// Step back one level. Returns false when main.rs should show the home screen.
    fn back(&mut self) -> bool {
        match self.state.screen {
            Screen::StageSelect => false,
            Screen::Battle => {
                logic::return_home(&mut self.state);
                self.state.add_log("バトルから撤退しました");
                true
            }
            Screen::Result => {
                logic::return_home(&mut self.state);
                false
            }
        }
    }
}

impl Game for BattleGame {
    fn handle_input(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Key(c) => self.handle_key(*c),
            InputEvent::Click(id) => self.handle_click(*id),
        }
    }

    fn tick(&mut self, delta_ticks: u32) {
        logic::tick(&mut self.state, delta_ticks);
    }

    fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(&self.state, f, area, click_state);
    }
}
