mod games;
mod input;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use games::{create_game, AppState};
use input::{is_narrow_layout, pixel_x_to_col, pixel_y_to_row, ClickState, InputEvent};
use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::{Frame, Terminal};
use ratzilla::{DomBackend, WebRenderer};
use time::GameTime;
use widgets::ClickableList;

use games::battle::state::TICKS_PER_SEC;

/// Back button shared by every screen. A game returns false for it when
/// the player should land on the home screen.
pub const BACK_TO_MENU: u16 = 999;

/// Home screen start button.
const START_GAME: u16 = 1;

/// Query the grid container's bounding rect and convert pixel coordinates to a cell.
fn dom_pixel_to_cell(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<(u16, u16)> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let click_x = mouse_x as f64 - rect.left();
    let click_y = mouse_y as f64 - rect.top();

    let col = pixel_x_to_col(click_x, rect.width(), cs.terminal_cols)?;
    let row = pixel_y_to_row(click_y, rect.height(), cs.terminal_rows)?;
    Some((col, row))
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// Route one input event. Unconsumed back input from a game returns home.
fn dispatch(app: &mut AppState, event: InputEvent) {
    let go_home = match app {
        AppState::Home => {
            if matches!(
                event,
                InputEvent::Click(START_GAME) | InputEvent::Key('\n') | InputEvent::Key(' ')
            ) {
                *app = AppState::Playing { game: create_game() };
            }
            false
        }
        AppState::Playing { game } => {
            let consumed = game.handle_input(&event);
            !consumed
                && matches!(event, InputEvent::Click(BACK_TO_MENU) | InputEvent::Key('q'))
        }
    };
    if go_home {
        *app = AppState::Home;
    }
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();

    let app = Rc::new(RefCell::new(AppState::Home));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let game_time = Rc::new(RefCell::new(GameTime::new(TICKS_PER_SEC)));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    // Mouse/touch click handler
    terminal.on_mouse_event({
        let app = app.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let cs = click_state.borrow();
            if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                return;
            }
            let Some((col, row)) = dom_pixel_to_cell(mouse_event.x, mouse_event.y, &cs) else {
                return;
            };
            let matched = cs.hit_test(col, row);
            drop(cs);

            if let Some(action_id) = matched {
                dispatch(&mut app.borrow_mut(), InputEvent::Click(action_id));
            }
        }
    });

    // Keyboard handler: Esc acts as 'q', Enter as '\n'.
    terminal.on_key_event({
        let app = app.clone();
        move |key_event| {
            let key = match key_event.code {
                KeyCode::Esc => 'q',
                KeyCode::Enter => '\n',
                KeyCode::Char(c) => c,
                _ => return,
            };
            dispatch(&mut app.borrow_mut(), InputEvent::Key(key));
        }
    });

    terminal.draw_web({
        let click_state = click_state.clone();
        move |f| {
            let ticks = game_time.borrow_mut().update(now_ms());
            let mut app = app.borrow_mut();
            let size = f.area();

            {
                let mut cs = click_state.borrow_mut();
                cs.terminal_cols = size.width;
                cs.terminal_rows = size.height;
                cs.clear_targets();
            }

            match &mut *app {
                AppState::Home => render_home(f, size, &click_state),
                AppState::Playing { game } => {
                    if ticks > 0 {
                        game.tick(ticks);
                    }
                    let chunks = Layout::default()
                        .direction(Direction::Vertical)
                        .constraints([Constraint::Min(10), Constraint::Length(1)])
                        .split(size);
                    game.render(f, chunks[0], &click_state);
                    render_back_bar(f, chunks[1], &click_state);
                }
            }
        }
    });

    Ok(())
}

fn render_home(f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let borders = if is_narrow_layout(area.width) {
        Borders::TOP | Borders::BOTTOM
    } else {
        Borders::ALL
    };

    let mut cl = ClickableList::new();
    cl.push(Line::from(""));
    cl.push(Line::from(Span::styled(
        "\u{1f30d} エコバトルクイズ \u{1f30d}",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )));
    cl.push(Line::from(Span::styled(
        "クイズに答えてモンスターを倒そう！",
        Style::default().fg(Color::Gray),
    )));
    cl.push(Line::from(""));
    let features = [
        ("\u{2694} バトルシステム", "正解するとモンスターを倒せる。早く答えるほど高得点！"),
        ("\u{1f33f} 環境を学ぼう", "外来生物や再生可能エネルギーのクイズに挑戦"),
        ("\u{2764} ハートHP", "まちがえるとハートが減る。3つなくなるとゲームオーバー"),
    ];
    for (title, body) in features {
        cl.push(Line::from(Span::styled(
            title,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        cl.push(Line::from(Span::styled(body, Style::default().fg(Color::White))));
        cl.push(Line::from(""));
    }
    cl.push_clickable(
        Line::from(Span::styled(
            " \u{25b6} [Enter] はじめる ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        START_GAME,
    );

    let block = Block::default()
        .borders(borders)
        .border_style(Style::default().fg(Color::Green));
    let inner_width = block.inner(area).width;

    let mut cs = click_state.borrow_mut();
    cl.register_targets(area, &mut cs, 1, 1, 0, inner_width);
    drop(cs);

    f.render_widget(
        Paragraph::new(cl.into_lines())
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn render_back_bar(f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let line = Line::from(Span::styled(
        " [Q] 戻る ",
        Style::default().fg(Color::DarkGray),
    ));
    f.render_widget(Paragraph::new(line), area);
    click_state
        .borrow_mut()
        .add_row_target(area, area.y, BACK_TO_MENU);
}
