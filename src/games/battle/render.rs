//! Eco Battle Quiz rendering (read-only from state).
//!
//! Stage select → battle (status, monster, question, options/feedback, log)
//! → result. Every `[X]` label is registered through `ClickableList`.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::ClickableList;

use super::actions::*;
use super::logic::{experience_into_level, get_job_title, stage_by_id};
use super::round::QuestionRound;
use super::state::{
    theme_info, BattlePhase, Difficulty, QuizState, Screen, ALL_THEMES, EXP_PER_LEVEL,
};

pub fn render(
    state: &QuizState,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    match state.screen {
        Screen::StageSelect => render_stage_select(state, f, area, click_state),
        Screen::Battle => render_battle(state, f, area, click_state),
        Screen::Result => render_result(state, f, area, click_state),
    }
}

// ── Helpers ─────────────────────────────────────────────────

fn borders_for(area_width: u16) -> Borders {
    if is_narrow_layout(area_width) {
        Borders::TOP | Borders::BOTTOM
    } else {
        Borders::ALL
    }
}

/// Content width inside `borders`, for wrap-aware click targets.
fn inner_width(area: Rect, borders: Borders) -> u16 {
    let mut w = area.width;
    if borders.contains(Borders::LEFT) {
        w = w.saturating_sub(1);
    }
    if borders.contains(Borders::RIGHT) {
        w = w.saturating_sub(1);
    }
    w
}

fn ratio_bar(ratio: f64, width: usize) -> (String, Color) {
    let ratio = ratio.clamp(0.0, 1.0);
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    let bar = "\u{2588}".repeat(filled) + &"\u{2591}".repeat(empty);
    let color = if ratio > 0.5 {
        Color::Green
    } else if ratio > 0.25 {
        Color::Yellow
    } else {
        Color::Red
    };
    (bar, color)
}

fn hearts(hp: u32, max: u32) -> String {
    "\u{2764}".repeat(hp as usize) + &"\u{2661}".repeat(max.saturating_sub(hp) as usize)
}

fn difficulty_label(d: Difficulty) -> &'static str {
    match d {
        Difficulty::Easy => "やさしい",
        Difficulty::Normal => "ふつう",
        Difficulty::Hard => "むずかしい",
    }
}

fn difficulty_color(d: Difficulty) -> Color {
    match d {
        Difficulty::Easy => Color::Green,
        Difficulty::Normal => Color::Yellow,
        Difficulty::Hard => Color::Red,
    }
}

fn render_log(state: &QuizState, f: &mut Frame, area: Rect, borders: Borders) {
    let max_lines = area.height.saturating_sub(2) as usize;
    let start = state.log.len().saturating_sub(max_lines);
    let lines: Vec<Line> = state.log[start..]
        .iter()
        .map(|msg| {
            Line::from(Span::styled(
                format!(" > {}", msg),
                Style::default().fg(Color::DarkGray),
            ))
        })
        .collect();

    let block = Block::default()
        .borders(borders)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" ログ ");
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

// ── Stage Select ────────────────────────────────────────────

fn render_stage_select(
    state: &QuizState,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let borders = borders_for(area.width);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(12), Constraint::Length(5)])
        .split(area);

    let mut cl = ClickableList::new();
    cl.push(Line::from(Span::styled(
        " 挑戦するステージを選んでください",
        Style::default().fg(Color::White),
    )));
    cl.push(Line::from(""));

    for (i, &theme) in ALL_THEMES.iter().enumerate() {
        let info = theme_info(theme);
        let id = THEME_BASE + i as u16;
        cl.push_clickable(
            Line::from(vec![
                Span::styled(
                    format!(" [{}] ", i + 1),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{} {}", info.icon, info.title),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
            ]),
            id,
        );
        cl.push_clickable(
            Line::from(Span::styled(
                format!("     {}", info.description),
                Style::default().fg(Color::Gray),
            )),
            id,
        );
        cl.push(Line::from(""));
    }

    if let Some(theme) = state.stored_theme {
        let info = theme_info(theme);
        cl.push_clickable(
            Line::from(vec![
                Span::styled(
                    " [0] ",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("前回のテーマで挑戦: {} {}", info.icon, info.title),
                    Style::default().fg(Color::Yellow),
                ),
            ]),
            START_STORED,
        );
    }

    let block = Block::default()
        .borders(borders)
        .border_style(Style::default().fg(Color::Green))
        .title(Span::styled(
            " ステージ選択 ",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ));

    let mut cs = click_state.borrow_mut();
    cl.register_targets(chunks[0], &mut cs, 1, 1, 0, inner_width(chunks[0], borders));
    drop(cs);

    f.render_widget(
        Paragraph::new(cl.into_lines()).block(block).wrap(Wrap { trim: false }),
        chunks[0],
    );
    render_log(state, f, chunks[1], borders);
}

// ── Battle ──────────────────────────────────────────────────

fn render_battle(
    state: &QuizState,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let borders = borders_for(area.width);
    let is_narrow = is_narrow_layout(area.width);

    let question = state.round.as_ref().map(|round| question_paragraph(round, is_narrow));
    let question_height = match &question {
        Some(p) => {
            let rows = p.line_count(inner_width(area, borders)) as u16;
            (rows + 2).clamp(4, (area.height / 3).max(4))
        }
        None => 4,
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),               // Status
            Constraint::Length(4),               // Monster
            Constraint::Length(question_height), // Question
            Constraint::Min(7),                  // Options / feedback
            Constraint::Length(4),               // Log
        ])
        .split(area);

    render_status(state, f, chunks[0], borders, is_narrow);
    render_monster(state, f, chunks[1], borders, is_narrow);

    let q_block = Block::default()
        .borders(borders)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 問題 ");
    match question {
        Some(p) => f.render_widget(p.block(q_block), chunks[2]),
        None => f.render_widget(
            Paragraph::new(Line::from(Span::styled(
                " 問題を準備できませんでした",
                Style::default().fg(Color::DarkGray),
            )))
            .block(q_block),
            chunks[2],
        ),
    }

    render_answers(state, f, chunks[3], borders, click_state);
    render_log(state, f, chunks[4], borders);
}

fn render_status(state: &QuizState, f: &mut Frame, area: Rect, borders: Borders, is_narrow: bool) {
    let battle = &state.game.current_battle;
    let stats = &battle.player_stats;
    let stage = stage_by_id(battle.stage_id);
    let stage_name = stage.map(|s| s.name).unwrap_or("");
    let monster_count = stage.map(|s| s.monster_count).unwrap_or(0);

    let exp = experience_into_level(stats.experience);
    let bar_width = if is_narrow { 10 } else { 20 };
    let (exp_bar, _) = ratio_bar(exp as f64 / EXP_PER_LEVEL as f64, bar_width);

    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" {}", stage_name),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  モンスター {} / {}", battle.monster_index + 1, monster_count),
                Style::default().fg(Color::Gray),
            ),
        ]),
        Line::from(vec![
            Span::styled(" HP ", Style::default().fg(Color::Gray)),
            Span::styled(
                hearts(battle.player_hp, battle.max_player_hp),
                Style::default().fg(Color::Red),
            ),
            Span::styled(
                format!("  Lv.{} ", stats.level),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                get_job_title(stats.level).name,
                Style::default().fg(Color::Cyan),
            ),
        ]),
        Line::from(vec![
            Span::styled(" EXP ", Style::default().fg(Color::Gray)),
            Span::styled(exp_bar, Style::default().fg(Color::Blue)),
            Span::styled(
                format!(" {}/{}", exp, EXP_PER_LEVEL),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(Span::styled(
            format!(" あと {} 経験値でレベルアップ！", EXP_PER_LEVEL - exp),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(vec![
            Span::styled(" スコア: ", Style::default().fg(Color::Gray)),
            Span::styled(
                battle.total_score.to_string(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  難易度: ", Style::default().fg(Color::Gray)),
            Span::styled(
                difficulty_label(battle.current_difficulty),
                Style::default().fg(difficulty_color(battle.current_difficulty)),
            ),
        ]),
    ];

    let block = Block::default()
        .borders(borders)
        .border_style(Style::default().fg(Color::Green))
        .title(Span::styled(
            " エコバトルクイズ ",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_monster(state: &QuizState, f: &mut Frame, area: Rect, borders: Borders, is_narrow: bool) {
    let lines = match &state.game.current_battle.current_monster {
        Some(m) => {
            let bar_width = if is_narrow { 10 } else { 20 };
            let (bar, color) = ratio_bar(
                if m.max_hp > 0 { m.current_hp as f64 / m.max_hp as f64 } else { 0.0 },
                bar_width,
            );
            let name_style = if m.is_defeated() {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
            };
            vec![
                Line::from(vec![
                    Span::raw(format!(" {} ", m.icon)),
                    Span::styled(m.name, name_style),
                ]),
                Line::from(vec![
                    Span::styled(" HP ", Style::default().fg(Color::Gray)),
                    Span::styled(bar, Style::default().fg(color)),
                    Span::styled(
                        format!(" {}/{}", m.current_hp, m.max_hp),
                        Style::default().fg(Color::White),
                    ),
                ]),
            ]
        }
        None => vec![Line::from("")],
    };

    let block = Block::default()
        .borders(borders)
        .border_style(Style::default().fg(Color::Red))
        .title(" モンスター ");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn question_paragraph(round: &QuestionRound, is_narrow: bool) -> Paragraph<'_> {
    let q = &round.question;
    let mut lines = vec![Line::from(Span::styled(
        format!(" {}", q.question),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    ))];

    if let Some(image) = &q.image {
        lines.push(Line::from(Span::styled(
            format!(" \u{1f5bc} {}", image),
            Style::default().fg(Color::Blue),
        )));
        if let Some(source) = &q.image_source {
            lines.push(Line::from(Span::styled(
                format!(" 画像提供：{}", source),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    let remaining = round.remaining_secs();
    let bar_width = if is_narrow { 10 } else { 20 };
    let (bar, color) = ratio_bar(round.remaining_ratio(), bar_width);
    lines.push(Line::from(vec![
        Span::styled(" 残り ", Style::default().fg(Color::Gray)),
        Span::styled(bar, Style::default().fg(color)),
        Span::styled(
            format!(" {}秒", remaining),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  配点 {}点", q.base_score),
            Style::default().fg(Color::DarkGray),
        ),
    ]));

    Paragraph::new(lines).wrap(Wrap { trim: false })
}

fn render_answers(
    state: &QuizState,
    f: &mut Frame,
    area: Rect,
    borders: Borders,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let mut cl = ClickableList::new();

    match &state.round {
        Some(round) if !round.is_resolved() => {
            for (i, option) in round.question.options.iter().enumerate() {
                push_choice(&mut cl, i, option);
            }
        }
        Some(round) => {
            let q = &round.question;
            for (i, option) in q.options.iter().enumerate() {
                let mark = if q.is_correct(i) {
                    Some(("\u{2b55}", Color::Green))
                } else if round.selected() == Some(i) {
                    Some(("\u{274c}", Color::Red))
                } else {
                    None
                };
                push_choice_resolved(&mut cl, i, option, mark);
            }
            cl.push(Line::from(""));

            let (headline, body, color) = if round.answered_correctly() {
                ("正解！", q.feedback.correct.as_str(), Color::Green)
            } else if round.selected().is_none() {
                ("時間切れ！", q.feedback.incorrect.as_str(), Color::Yellow)
            } else {
                ("不正解…", q.feedback.incorrect.as_str(), Color::Red)
            };
            cl.push(Line::from(Span::styled(
                format!(" {}", headline),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            cl.push(Line::from(Span::styled(
                format!(" {}", body),
                Style::default().fg(Color::White),
            )));
            cl.push(Line::from(""));

            let label = match state.game.phase() {
                BattlePhase::StageClear => " [Enter] ステージクリア！結果を見る",
                BattlePhase::GameOver => " [Enter] 結果を見る",
                BattlePhase::Active => " [Enter] 次の問題へ",
            };
            cl.push_clickable(
                Line::from(Span::styled(
                    label,
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )),
                CONTINUE,
            );
        }
        None => {
            cl.push(Line::from(Span::styled(
                " クイズが見つかりません",
                Style::default().fg(Color::DarkGray),
            )));
            cl.push(Line::from(""));
            cl.push_clickable(
                Line::from(Span::styled(
                    " [R] もう一度読み込む",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )),
                RETRY_QUESTION,
            );
        }
    }

    let title = match &state.round {
        Some(round) if round.is_resolved() => " 結果 ",
        _ => " 答えを選んでください ",
    };
    let block = Block::default()
        .borders(borders)
        .border_style(Style::default().fg(Color::Yellow))
        .title(title);

    let mut cs = click_state.borrow_mut();
    cl.register_targets(area, &mut cs, 1, 1, 0, inner_width(area, borders));
    drop(cs);

    f.render_widget(
        Paragraph::new(cl.into_lines()).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

// ── Result ──────────────────────────────────────────────────

fn render_result(
    state: &QuizState,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let borders = borders_for(area.width);
    let battle = &state.game.current_battle;
    let stats = &battle.player_stats;
    let cleared = state.game.phase() == BattlePhase::StageClear;

    let (title, color) = if cleared {
        ("\u{1f389} ステージクリア！", Color::Yellow)
    } else {
        ("ゲームオーバー", Color::Red)
    };

    let mut cl = ClickableList::new();
    cl.push(Line::from(""));
    cl.push(Line::from(Span::styled(
        title,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )));
    cl.push(Line::from(""));
    cl.push(Line::from(vec![
        Span::styled("スコア: ", Style::default().fg(Color::Gray)),
        Span::styled(
            battle.total_score.to_string(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
    ]));
    if cleared {
        cl.push(Line::from(vec![
            Span::styled("レベル: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("Lv.{} {}", stats.level, get_job_title(stats.level).name),
                Style::default().fg(Color::Cyan),
            ),
        ]));
    }
    cl.push(Line::from(Span::styled(
        format!("正解数: {} / {}", battle.correct_answers, battle.questions_answered),
        Style::default().fg(Color::Gray),
    )));
    cl.push(Line::from(""));
    cl.push_clickable(
        Line::from(Span::styled(" [1] もう一度挑戦", Style::default().fg(Color::White))),
        PLAY_AGAIN,
    );
    cl.push_clickable(
        Line::from(Span::styled(" [2] ステージ選択へ", Style::default().fg(Color::White))),
        BACK_TO_STAGES,
    );
    cl.push_clickable(
        Line::from(Span::styled(" [Q] ホームに戻る", Style::default().fg(Color::DarkGray))),
        crate::BACK_TO_MENU,
    );

    let block = Block::default()
        .borders(borders)
        .border_style(Style::default().fg(color))
        .title(" リザルト ");

    let mut cs = click_state.borrow_mut();
    cl.register_targets(area, &mut cs, 1, 1, 0, inner_width(area, borders));
    drop(cs);

    f.render_widget(
        Paragraph::new(cl.into_lines())
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false }),
        area,
    );
}

// ── Choice Helper ───────────────────────────────────────────

fn push_choice(cl: &mut ClickableList, index: usize, label: &str) {
    cl.push_clickable(
        Line::from(vec![
            Span::styled(
                format!(" [{}] ", index + 1),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(label.to_string(), Style::default().fg(Color::White)),
        ]),
        OPTION_BASE + index as u16,
    );
}

/// Options after the answer: still registered, but the round ignores them.
fn push_choice_resolved(
    cl: &mut ClickableList,
    index: usize,
    label: &str,
    mark: Option<(&str, Color)>,
) {
    let (marker, color) = match mark {
        Some((m, c)) => (format!(" {}", m), c),
        None => (String::new(), Color::DarkGray),
    };
    cl.push_clickable(
        Line::from(vec![
            Span::styled(
                format!(" [{}] ", index + 1),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("{}{}", label, marker), Style::default().fg(color)),
        ]),
        OPTION_BASE + index as u16,
    );
}
