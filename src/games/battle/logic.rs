//! Eco Battle Quiz: pure game logic (no rendering / IO).
//!
//! The battle core is [`apply_answer`]: one answer event moves a
//! [`GameState`] to its next value. Everything below it wires question
//! rounds, the countdown and the log around that core.

use super::round::{AnswerOutcome, QuestionRound};
use super::state::{
    monster_names, BattlePhase, BattleState, Difficulty, GameState, JobRank, Monster, QuizState,
    Screen, Stage, Theme, EXP_PER_CORRECT, EXP_PER_LEVEL, JOB_PROGRESSION, MONSTER_ICONS,
    PROMOTION_STREAK, STAGES,
};

// ── RNG ───────────────────────────────────────────────────────

fn next_rng(seed: u64) -> u64 {
    seed.wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407)
}

fn roll(state: &mut QuizState) -> u64 {
    state.rng_seed = next_rng(state.rng_seed);
    state.rng_seed >> 33
}

// ── Derivations ───────────────────────────────────────────────

/// Base score for the difficulty plus a time bonus of up to the same
/// amount again: `base + floor(time_remaining / max_time * base)`.
///
/// `time_remaining` is clamped to `max_time`; a zero `max_time` earns no
/// bonus.
pub fn calculate_score(difficulty: Difficulty, time_remaining: u32, max_time: u32) -> u32 {
    let base = difficulty.base_score();
    if max_time == 0 {
        return base;
    }
    let t = time_remaining.min(max_time) as u64;
    let bonus = t * base as u64 / max_time as u64;
    base + bonus as u32
}

/// Tiered experience per difficulty. The answer transition awards a flat
/// [`EXP_PER_CORRECT`] instead.
#[allow(dead_code)] // Kept for a tiered ruleset
pub fn calculate_experience(difficulty: Difficulty) -> u32 {
    match difficulty {
        Difficulty::Easy => 10,
        Difficulty::Normal => 20,
        Difficulty::Hard => 30,
    }
}

pub fn level_for_experience(experience: u32) -> u32 {
    experience / EXP_PER_LEVEL + 1
}

/// Highest rank whose threshold the level has reached.
pub fn get_job_title(level: u32) -> &'static JobRank {
    JOB_PROGRESSION
        .iter()
        .rev()
        .find(|rank| rank.min_level <= level)
        .unwrap_or(&JOB_PROGRESSION[0])
}

pub fn calculate_attack_power(level: u32) -> u32 {
    1 + level.saturating_sub(1) / 5
}

pub fn stage_by_id(id: u32) -> Option<&'static Stage> {
    STAGES.iter().find(|s| s.id == id)
}

pub fn stage_for_theme(theme: Theme) -> Option<&'static Stage> {
    STAGES.iter().find(|s| s.theme == theme)
}

/// Monster at `index` within a stage. Names cycle through the theme pool,
/// icons through the shared pool. HP and attack are pinned to 1; the
/// stage's base values are not applied.
pub fn generate_monster(stage: &Stage, index: u32) -> Monster {
    let names = monster_names(stage.theme);
    let i = index as usize;
    Monster {
        id: format!("monster-{}-{}", stage.id, index),
        name: names[i % names.len()],
        max_hp: 1,
        current_hp: 1,
        attack_power: 1,
        icon: MONSTER_ICONS[i % MONSTER_ICONS.len()],
    }
}

// ── Battle core ───────────────────────────────────────────────

/// What one answer did to the battle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnswerEffect {
    /// Terminal phase, no monster, or unknown stage: nothing changed.
    Ignored,
    Correct {
        score: u32,
        level_up: bool,
        promoted: bool,
        stage_clear: bool,
    },
    Incorrect {
        damage: u32,
        demoted: bool,
        game_over: bool,
    },
}

/// Apply one answer to the battle.
pub fn apply_answer(
    game: &mut GameState,
    question_id: &str,
    difficulty: Difficulty,
    is_correct: bool,
    time_remaining: u32,
    time_limit: u32,
) -> AnswerEffect {
    if game.phase() != BattlePhase::Active {
        return AnswerEffect::Ignored;
    }
    let stage = match stage_by_id(game.current_battle.stage_id) {
        Some(s) => s,
        None => return AnswerEffect::Ignored,
    };
    let battle = &mut game.current_battle;
    let monster = match battle.current_monster.as_mut() {
        Some(m) => m,
        None => return AnswerEffect::Ignored,
    };

    battle.questions_answered += 1;
    battle.used_question_ids.insert(question_id.to_string());

    if is_correct {
        let score = calculate_score(difficulty, time_remaining, time_limit);
        battle.total_score += score;

        let stats = &mut battle.player_stats;
        let old_level = stats.level;
        stats.experience += EXP_PER_CORRECT;
        stats.level = level_for_experience(stats.experience);
        stats.job_title = get_job_title(stats.level).title;
        stats.attack_power = calculate_attack_power(stats.level);
        let level_up = stats.level > old_level;

        battle.consecutive_correct_answers += 1;
        let mut promoted = false;
        if battle.consecutive_correct_answers >= PROMOTION_STREAK {
            let next = battle.current_difficulty.promoted();
            promoted = next != battle.current_difficulty;
            battle.current_difficulty = next;
            battle.consecutive_correct_answers = 0;
        }

        monster.current_hp = 0;
        battle.correct_answers += 1;

        let next_index = battle.monster_index + 1;
        let stage_clear = next_index >= stage.monster_count;
        if stage_clear {
            game.stage_clear = true;
        } else {
            battle.monster_index = next_index;
            battle.current_monster = Some(generate_monster(stage, next_index));
        }

        AnswerEffect::Correct { score, level_up, promoted, stage_clear }
    } else {
        let damage = monster.attack_power.max(1);
        battle.player_hp = battle.player_hp.saturating_sub(damage);

        let next = battle.current_difficulty.demoted();
        let demoted = next != battle.current_difficulty;
        battle.current_difficulty = next;
        battle.consecutive_correct_answers = 0;

        let game_over = battle.player_hp == 0;
        if game_over {
            game.game_over = true;
        }

        AnswerEffect::Incorrect { damage, demoted, game_over }
    }
}

pub fn apply_outcome(game: &mut GameState, outcome: &AnswerOutcome) -> AnswerEffect {
    apply_answer(
        game,
        &outcome.question_id,
        outcome.difficulty,
        outcome.is_correct,
        outcome.time_remaining,
        outcome.time_limit,
    )
}

/// Start a fresh battle on the theme's stage. No-op if no stage matches.
pub fn initialize_battle(game: &mut GameState, theme: Theme) -> bool {
    let stage = match stage_for_theme(theme) {
        Some(s) => s,
        None => return false,
    };
    let mut battle = BattleState::new(stage.id);
    battle.current_monster = Some(generate_monster(stage, 0));

    *game = GameState {
        selected_theme: Some(theme),
        current_stage: stage.id,
        current_battle: battle,
        game_over: false,
        stage_clear: false,
    };
    true
}

pub fn reset_game(game: &mut GameState) {
    *game = GameState::new();
}

// ── Tick ──────────────────────────────────────────────────────

/// Drive the question countdown. A timeout is an incorrect answer with no
/// time left.
pub fn tick(state: &mut QuizState, delta_ticks: u32) {
    if state.screen != Screen::Battle {
        return;
    }
    let outcome = match state.round.as_mut() {
        Some(round) => round.tick(delta_ticks),
        None => None,
    };
    if let Some(outcome) = outcome {
        resolve(state, &outcome);
    }
}

// ── Flow ──────────────────────────────────────────────────────

/// Remember the chosen theme and start its battle.
pub fn select_theme(state: &mut QuizState, theme: Theme) -> bool {
    state.stored_theme = Some(theme);
    start_battle(state)
}

/// Begin a battle with the stored theme. Without one, stay on stage select.
pub fn start_battle(state: &mut QuizState) -> bool {
    let theme = match state.stored_theme {
        Some(t) => t,
        None => {
            state.screen = Screen::StageSelect;
            state.add_log("テーマを選んでください");
            return false;
        }
    };
    if !initialize_battle(&mut state.game, theme) {
        return false;
    }
    state.round = None;
    state.screen = Screen::Battle;
    if let Some(stage) = stage_for_theme(theme) {
        state.add_log(&format!("{} に挑戦！", stage.name));
    }
    next_question(state);
    true
}

/// Put the next question on screen. Returns false when none could be found.
pub fn next_question(state: &mut QuizState) -> bool {
    if state.game.phase() != BattlePhase::Active {
        return false;
    }
    let theme = match state.game.selected_theme {
        Some(t) => t,
        None => return false,
    };
    if state.bank.is_none() {
        state.round = None;
        state.add_log("クイズの読み込みに失敗しました");
        return false;
    }
    let r = roll(state);
    let battle = &state.game.current_battle;
    let picked = state.bank.as_ref().and_then(|bank| {
        bank.select(theme, battle.current_difficulty, &battle.used_question_ids, r)
            .cloned()
    });
    match picked {
        Some(q) => {
            state.round = Some(QuestionRound::new(q));
            true
        }
        None => {
            state.round = None;
            state.add_log("クイズが見つかりません");
            false
        }
    }
}

/// Player picks an option for the current question.
pub fn answer(state: &mut QuizState, option: usize) -> bool {
    if state.screen != Screen::Battle {
        return false;
    }
    let outcome = match state.round.as_mut() {
        Some(round) => round.answer(option),
        None => None,
    };
    match outcome {
        Some(outcome) => {
            resolve(state, &outcome);
            true
        }
        None => false,
    }
}

fn resolve(state: &mut QuizState, outcome: &AnswerOutcome) {
    state.add_log(if outcome.timed_out {
        "時間切れ！不正解です。"
    } else if outcome.is_correct {
        "正解！"
    } else {
        "不正解。"
    });
    match apply_outcome(&mut state.game, outcome) {
        AnswerEffect::Correct { score, level_up, promoted, stage_clear } => {
            state.add_log(&format!("モンスターを倒した！ +{} 点", score));
            if level_up {
                let stats = &state.game.current_battle.player_stats;
                let msg = format!(
                    "レベルアップ！ Lv.{} ({})",
                    stats.level,
                    get_job_title(stats.level).name
                );
                state.add_log(&msg);
            }
            if promoted {
                let d = state.game.current_battle.current_difficulty;
                state.add_log(&format!("難易度アップ: {}", d.key()));
            }
            if stage_clear {
                state.add_log("ステージクリア！");
            }
        }
        AnswerEffect::Incorrect { damage, demoted, game_over } => {
            state.add_log(&format!("{} ダメージを受けた", damage));
            if demoted {
                let d = state.game.current_battle.current_difficulty;
                state.add_log(&format!("難易度ダウン: {}", d.key()));
            }
            if game_over {
                state.add_log("ゲームオーバー");
            }
        }
        AnswerEffect::Ignored => {}
    }
}

/// Feedback dismissed: show the result screen after a terminal answer,
/// otherwise load the next question.
pub fn continue_after_feedback(state: &mut QuizState) -> bool {
    if state.screen != Screen::Battle {
        return false;
    }
    match state.round.as_ref().map(|r| r.is_resolved()) {
        Some(true) => {}
        Some(false) => return false,
        // No question could be loaded; let the player retry.
        None => return next_question(state),
    }
    if state.game.phase() != BattlePhase::Active {
        state.screen = Screen::Result;
        return true;
    }
    next_question(state)
}

/// Leave the battle: discard it and go back to stage select.
pub fn return_home(state: &mut QuizState) {
    reset_game(&mut state.game);
    state.round = None;
    state.screen = Screen::StageSelect;
}

/// Experience toward the next level, out of [`EXP_PER_LEVEL`].
pub fn experience_into_level(experience: u32) -> u32 {
    experience % EXP_PER_LEVEL
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::battle::questions::QuestionBank;
    use crate::games::battle::state::{JobTitle, ALL_THEMES, MAX_PLAYER_HP, TICKS_PER_SEC};
    use proptest::prelude::*;

    fn battle(theme: Theme) -> GameState {
        let mut g = GameState::new();
        assert!(initialize_battle(&mut g, theme));
        g
    }

    fn correct(g: &mut GameState, id: &str) -> AnswerEffect {
        let d = g.current_battle.current_difficulty;
        apply_answer(g, id, d, true, 5, 10)
    }

    fn wrong(g: &mut GameState, id: &str) -> AnswerEffect {
        let d = g.current_battle.current_difficulty;
        apply_answer(g, id, d, false, 0, 10)
    }

    fn small_bank() -> QuestionBank {
        let mut entries = Vec::new();
        for theme in ["alienspecies", "energy"] {
            for difficulty in ["EASY", "NORMAL", "HARD"] {
                for n in 0..2 {
                    entries.push(format!(
                        r#"{{"id":"{theme}-{difficulty}-{n}","theme":"{theme}","difficulty":"{difficulty}",
                           "question":"?","options":["a","b","c"],"correctAnswer":2,
                           "feedback":{{"correct":"o","incorrect":"x"}},"timeLimit":10,"baseScore":100}}"#
                    ));
                }
            }
        }
        QuestionBank::from_json(&format!(r#"{{"questions":[{}]}}"#, entries.join(","))).unwrap()
    }

    fn quiz() -> QuizState {
        QuizState::new(Some(small_bank()))
    }

    // ── Derivations ─────────────────────────────────────────

    #[test]
    fn score_examples() {
        assert_eq!(calculate_score(Difficulty::Normal, 10, 10), 400);
        assert_eq!(calculate_score(Difficulty::Easy, 0, 10), 100);
        assert_eq!(calculate_score(Difficulty::Hard, 5, 10), 450);
        assert_eq!(calculate_score(Difficulty::Easy, 1, 3), 133);
    }

    #[test]
    fn score_degenerate_inputs() {
        assert_eq!(calculate_score(Difficulty::Easy, 5, 0), 100);
        assert_eq!(calculate_score(Difficulty::Easy, 20, 10), 200);
    }

    #[test]
    fn experience_tiers() {
        assert_eq!(calculate_experience(Difficulty::Easy), 10);
        assert_eq!(calculate_experience(Difficulty::Normal), 20);
        assert_eq!(calculate_experience(Difficulty::Hard), 30);
    }

    #[test]
    fn attack_power_examples() {
        assert_eq!(calculate_attack_power(1), 1);
        assert_eq!(calculate_attack_power(5), 1);
        assert_eq!(calculate_attack_power(6), 2);
        assert_eq!(calculate_attack_power(11), 3);
    }

    #[test]
    fn job_title_thresholds() {
        assert_eq!(get_job_title(1).title, JobTitle::Explorer);
        assert_eq!(get_job_title(10).title, JobTitle::Explorer);
        assert_eq!(get_job_title(11).title, JobTitle::Ranger);
        assert_eq!(get_job_title(20).title, JobTitle::Ranger);
        assert_eq!(get_job_title(21).title, JobTitle::Guardian);
        assert_eq!(get_job_title(31).title, JobTitle::Champion);
        assert_eq!(get_job_title(40).title, JobTitle::Champion);
        assert_eq!(get_job_title(41).title, JobTitle::Hero);
        assert_eq!(get_job_title(999).title, JobTitle::Hero);
        assert_eq!(get_job_title(0).title, JobTitle::Explorer);
        assert_eq!(get_job_title(1).name, "自然の探検家");
    }

    #[test]
    fn monster_generation_cycles_pools() {
        let stage = stage_for_theme(Theme::AlienSpecies).unwrap();
        let m0 = generate_monster(stage, 0);
        assert_eq!(m0.id, "monster-1-0");
        assert_eq!(m0.name, "ゴミモンスター");
        assert_eq!(m0.icon, "👹");
        let m3 = generate_monster(stage, 3);
        assert_eq!(m3.name, "ゴミモンスター");
        assert_eq!(m3.icon, "🐉");
        let m5 = generate_monster(stage, 5);
        assert_eq!(m5.icon, "👹");
        assert_eq!(m5.id, "monster-1-5");
    }

    #[test]
    fn monsters_pinned_to_one() {
        let stage = stage_for_theme(Theme::Energy).unwrap();
        for i in 0..stage.monster_count {
            let m = generate_monster(stage, i);
            assert_eq!((m.max_hp, m.current_hp, m.attack_power), (1, 1, 1));
        }
    }

    // ── Initialization ──────────────────────────────────────

    #[test]
    fn initialize_battle_resets_everything() {
        let mut g = battle(Theme::Energy);
        correct(&mut g, "a");
        wrong(&mut g, "b");
        assert!(initialize_battle(&mut g, Theme::Energy));
        let b = &g.current_battle;
        assert_eq!(g.selected_theme, Some(Theme::Energy));
        assert_eq!(g.current_stage, 2);
        assert_eq!(b.stage_id, 2);
        assert_eq!(b.monster_index, 0);
        assert_eq!(b.current_monster.as_ref().unwrap().id, "monster-2-0");
        assert_eq!(b.player_hp, MAX_PLAYER_HP);
        assert_eq!(b.player_stats.level, 1);
        assert_eq!(b.player_stats.experience, 0);
        assert_eq!(b.current_difficulty, Difficulty::Easy);
        assert!(b.used_question_ids.is_empty());
        assert!(!g.game_over && !g.stage_clear);
    }

    #[test]
    fn every_theme_initializes() {
        for theme in ALL_THEMES {
            let g = battle(theme);
            assert_eq!(g.phase(), BattlePhase::Active);
        }
    }

    #[test]
    fn reset_game_clears_theme() {
        let mut g = battle(Theme::AlienSpecies);
        reset_game(&mut g);
        assert_eq!(g, GameState::new());
        assert_eq!(g.selected_theme, None);
    }

    // ── Correct answers ─────────────────────────────────────

    #[test]
    fn correct_answer_defeats_and_advances() {
        let mut g = battle(Theme::AlienSpecies);
        let effect = apply_answer(&mut g, "q1", Difficulty::Normal, true, 10, 10);
        assert_eq!(
            effect,
            AnswerEffect::Correct { score: 400, level_up: false, promoted: false, stage_clear: false }
        );
        let b = &g.current_battle;
        assert_eq!(b.total_score, 400);
        assert_eq!(b.player_stats.experience, 50);
        assert_eq!(b.correct_answers, 1);
        assert_eq!(b.questions_answered, 1);
        assert_eq!(b.monster_index, 1);
        assert_eq!(b.current_monster.as_ref().unwrap().id, "monster-1-1");
        assert!(b.used_question_ids.contains("q1"));
        assert_eq!(b.consecutive_correct_answers, 1);
    }

    #[test]
    fn flat_fifty_experience_levels_every_two() {
        let mut g = battle(Theme::Energy);
        correct(&mut g, "a");
        assert_eq!(g.current_battle.player_stats.level, 1);
        let effect = correct(&mut g, "b");
        assert!(matches!(effect, AnswerEffect::Correct { level_up: true, .. }));
        assert_eq!(g.current_battle.player_stats.experience, 100);
        assert_eq!(g.current_battle.player_stats.level, 2);
    }

    #[test]
    fn three_correct_promote_easy_to_normal() {
        let mut g = battle(Theme::Energy);
        correct(&mut g, "a");
        correct(&mut g, "b");
        assert_eq!(g.current_battle.current_difficulty, Difficulty::Easy);
        let effect = correct(&mut g, "c");
        assert!(matches!(effect, AnswerEffect::Correct { promoted: true, .. }));
        assert_eq!(g.current_battle.current_difficulty, Difficulty::Normal);
        assert_eq!(g.current_battle.consecutive_correct_answers, 0);
    }

    #[test]
    fn six_correct_reach_hard_and_hard_absorbs() {
        let mut g = battle(Theme::Energy);
        for i in 0..6 {
            correct(&mut g, &format!("q{}", i));
        }
        assert_eq!(g.current_battle.current_difficulty, Difficulty::Hard);
        for i in 6..9 {
            correct(&mut g, &format!("q{}", i));
        }
        assert_eq!(g.current_battle.current_difficulty, Difficulty::Hard);
        assert_eq!(g.current_battle.consecutive_correct_answers, 0);
    }

    #[test]
    fn tenth_monster_clears_stage_without_eleventh() {
        let mut g = battle(Theme::AlienSpecies);
        for i in 0..9 {
            correct(&mut g, &format!("q{}", i));
        }
        assert_eq!(g.current_battle.monster_index, 9);
        assert!(!g.stage_clear);
        let effect = correct(&mut g, "q9");
        assert!(matches!(effect, AnswerEffect::Correct { stage_clear: true, .. }));
        assert!(g.stage_clear);
        assert!(!g.game_over);
        assert_eq!(g.phase(), BattlePhase::StageClear);
        let b = &g.current_battle;
        assert_eq!(b.monster_index, 9);
        let last = b.current_monster.as_ref().unwrap();
        assert_eq!(last.id, "monster-1-9");
        assert!(last.is_defeated());
        assert_eq!(b.correct_answers, 10);
    }

    // ── Incorrect answers ───────────────────────────────────

    #[test]
    fn incorrect_answer_damages_and_resets_streak() {
        let mut g = battle(Theme::Energy);
        correct(&mut g, "a");
        correct(&mut g, "b");
        let effect = wrong(&mut g, "c");
        assert_eq!(effect, AnswerEffect::Incorrect { damage: 1, demoted: false, game_over: false });
        let b = &g.current_battle;
        assert_eq!(b.player_hp, 2);
        assert_eq!(b.consecutive_correct_answers, 0);
        assert_eq!(b.monster_index, 2);
        assert!(b.used_question_ids.contains("c"));
        assert_eq!(b.questions_answered, 3);
        assert_eq!(b.correct_answers, 2);
    }

    #[test]
    fn incorrect_at_hard_demotes_once() {
        let mut g = battle(Theme::Energy);
        g.current_battle.current_difficulty = Difficulty::Hard;
        let effect = wrong(&mut g, "a");
        assert!(matches!(effect, AnswerEffect::Incorrect { demoted: true, .. }));
        assert_eq!(g.current_battle.current_difficulty, Difficulty::Normal);
    }

    #[test]
    fn incorrect_at_easy_stays_easy() {
        let mut g = battle(Theme::Energy);
        let effect = wrong(&mut g, "a");
        assert!(matches!(effect, AnswerEffect::Incorrect { demoted: false, .. }));
        assert_eq!(g.current_battle.current_difficulty, Difficulty::Easy);
    }

    #[test]
    fn three_misses_end_the_game() {
        let mut g = battle(Theme::AlienSpecies);
        wrong(&mut g, "a");
        wrong(&mut g, "b");
        assert!(!g.game_over);
        let effect = wrong(&mut g, "c");
        assert_eq!(effect, AnswerEffect::Incorrect { damage: 1, demoted: false, game_over: true });
        assert_eq!(g.current_battle.player_hp, 0);
        assert!(g.game_over);
        assert_eq!(g.phase(), BattlePhase::GameOver);
    }

    #[test]
    fn damage_uses_monster_attack_and_floors_at_zero() {
        let mut g = battle(Theme::AlienSpecies);
        if let Some(m) = g.current_battle.current_monster.as_mut() {
            m.attack_power = 5;
        }
        let effect = wrong(&mut g, "a");
        assert!(matches!(effect, AnswerEffect::Incorrect { damage: 5, game_over: true, .. }));
        assert_eq!(g.current_battle.player_hp, 0);
    }

    // ── Guards ──────────────────────────────────────────────

    #[test]
    fn terminal_states_absorb_answers() {
        let mut g = battle(Theme::AlienSpecies);
        for id in ["a", "b", "c"] {
            wrong(&mut g, id);
        }
        let before = g.clone();
        assert_eq!(correct(&mut g, "d"), AnswerEffect::Ignored);
        assert_eq!(wrong(&mut g, "e"), AnswerEffect::Ignored);
        assert_eq!(g, before);
    }

    #[test]
    fn no_monster_is_noop() {
        let mut g = GameState::new();
        let before = g.clone();
        assert_eq!(correct(&mut g, "a"), AnswerEffect::Ignored);
        assert_eq!(g, before);
    }

    #[test]
    fn unknown_stage_is_noop() {
        let mut g = battle(Theme::Energy);
        g.current_battle.stage_id = 99;
        let before = g.clone();
        assert_eq!(correct(&mut g, "a"), AnswerEffect::Ignored);
        assert_eq!(g, before);
    }

    #[test]
    fn repeated_question_id_recorded_once() {
        let mut g = battle(Theme::Energy);
        correct(&mut g, "same");
        wrong(&mut g, "same");
        assert_eq!(g.current_battle.used_question_ids.len(), 1);
    }

    // ── Flow ────────────────────────────────────────────────

    #[test]
    fn start_without_theme_stays_on_stage_select() {
        let mut s = quiz();
        assert!(!start_battle(&mut s));
        assert_eq!(s.screen, Screen::StageSelect);
        assert!(s.round.is_none());
    }

    #[test]
    fn select_theme_loads_first_question() {
        let mut s = quiz();
        assert!(select_theme(&mut s, Theme::Energy));
        assert_eq!(s.screen, Screen::Battle);
        assert_eq!(s.stored_theme, Some(Theme::Energy));
        let round = s.round.as_ref().unwrap();
        assert_eq!(round.question.theme, Theme::Energy);
        assert_eq!(round.question.difficulty, Difficulty::Easy);
    }

    #[test]
    fn answer_then_continue_loads_unused_question() {
        let mut s = quiz();
        select_theme(&mut s, Theme::AlienSpecies);
        let first = s.round.as_ref().unwrap().question.id.clone();
        assert!(answer(&mut s, 2));
        assert!(!answer(&mut s, 2), "second answer must be ignored");
        assert_eq!(s.game.current_battle.correct_answers, 1);
        assert!(continue_after_feedback(&mut s));
        let second = s.round.as_ref().unwrap().question.id.clone();
        assert_ne!(first, second);
    }

    #[test]
    fn continue_requires_resolved_round() {
        let mut s = quiz();
        select_theme(&mut s, Theme::Energy);
        assert!(!continue_after_feedback(&mut s));
    }

    #[test]
    fn timeout_counts_as_wrong_once() {
        let mut s = quiz();
        select_theme(&mut s, Theme::Energy);
        tick(&mut s, 10 * TICKS_PER_SEC);
        assert_eq!(s.game.current_battle.player_hp, 2);
        tick(&mut s, 10 * TICKS_PER_SEC);
        assert_eq!(s.game.current_battle.player_hp, 2);
        assert!(!answer(&mut s, 2));
        assert!(s.log.iter().any(|l| l.contains("時間切れ")));
    }

    #[test]
    fn fallback_reuses_pool_when_exhausted() {
        let mut s = quiz();
        select_theme(&mut s, Theme::Energy);
        // EASY pool has two questions; the third question still loads.
        for _ in 0..2 {
            answer(&mut s, 0);
            continue_after_feedback(&mut s);
        }
        answer(&mut s, 0);
        assert!(s.game.game_over);
        assert!(continue_after_feedback(&mut s));
        assert_eq!(s.screen, Screen::Result);
    }

    #[test]
    fn stage_clear_reaches_result_screen() {
        let mut s = quiz();
        select_theme(&mut s, Theme::AlienSpecies);
        for _ in 0..10 {
            assert!(answer(&mut s, 2));
            continue_after_feedback(&mut s);
        }
        assert!(s.game.stage_clear);
        assert_eq!(s.screen, Screen::Result);
        assert_eq!(s.game.current_battle.player_stats.level, 6);
    }

    #[test]
    fn missing_bank_reports_notice() {
        let mut s = QuizState::new(None);
        assert!(select_theme(&mut s, Theme::Energy));
        assert!(s.round.is_none());
        assert!(s.log.iter().any(|l| l.contains("読み込みに失敗")));
    }

    #[test]
    fn empty_pool_reports_notice() {
        let json = r#"{"questions":[{"id":"a","theme":"energy","difficulty":"HARD",
            "question":"?","options":["a"],"correctAnswer":0,
            "feedback":{"correct":"c","incorrect":"i"},"timeLimit":10,"baseScore":100}]}"#;
        let mut s = QuizState::new(Some(QuestionBank::from_json(json).unwrap()));
        select_theme(&mut s, Theme::Energy);
        assert!(s.round.is_none());
        assert!(s.log.iter().any(|l| l.contains("クイズが見つかりません")));
    }

    #[test]
    fn return_home_discards_battle() {
        let mut s = quiz();
        select_theme(&mut s, Theme::Energy);
        answer(&mut s, 2);
        return_home(&mut s);
        assert_eq!(s.screen, Screen::StageSelect);
        assert_eq!(s.game, GameState::new());
        assert!(s.round.is_none());
        assert_eq!(s.stored_theme, Some(Theme::Energy));
    }

    #[test]
    fn tick_outside_battle_is_noop() {
        let mut s = quiz();
        tick(&mut s, 1000);
        assert_eq!(s.game, GameState::new());
    }

    #[test]
    fn experience_bar_wraps_per_level() {
        assert_eq!(experience_into_level(0), 0);
        assert_eq!(experience_into_level(150), 50);
        assert_eq!(experience_into_level(200), 0);
    }

    // ── Properties ──────────────────────────────────────────

    fn arb_difficulty() -> impl Strategy<Value = Difficulty> {
        prop_oneof![
            Just(Difficulty::Easy),
            Just(Difficulty::Normal),
            Just(Difficulty::Hard),
        ]
    }

    proptest! {
        #[test]
        fn prop_score_between_base_and_double(
            d in arb_difficulty(),
            max_time in 1u32..120,
            frac in 0.0f64..=1.0,
        ) {
            let t = (max_time as f64 * frac) as u32;
            let score = calculate_score(d, t, max_time);
            prop_assert!(score >= d.base_score());
            prop_assert!(score <= 2 * d.base_score());
            prop_assert_eq!(calculate_score(d, max_time, max_time), 2 * d.base_score());
        }

        #[test]
        fn prop_attack_power_formula(level in 1u32..10_000) {
            prop_assert_eq!(calculate_attack_power(level), 1 + (level - 1) / 5);
        }

        #[test]
        fn prop_job_title_monotonic(level in 1u32..10_000) {
            prop_assert!(get_job_title(level).title <= get_job_title(level + 1).title);
        }

        #[test]
        fn prop_hp_never_underflows(answers in proptest::collection::vec(any::<bool>(), 0..40)) {
            let mut g = battle(Theme::Energy);
            for (i, ok) in answers.iter().enumerate() {
                let d = g.current_battle.current_difficulty;
                let prev_exp = g.current_battle.player_stats.experience;
                apply_answer(&mut g, &format!("q{}", i), d, *ok, 3, 10);
                let b = &g.current_battle;
                prop_assert!(b.player_hp <= b.max_player_hp);
                prop_assert!(b.player_stats.experience >= prev_exp);
                prop_assert!(b.monster_index < 10);
                prop_assert!(b.consecutive_correct_answers < PROMOTION_STREAK);
                prop_assert_eq!(b.player_stats.job_title, get_job_title(b.player_stats.level).title);
                prop_assert!(!(g.game_over && g.stage_clear));
                prop_assert_eq!(g.game_over, b.player_hp == 0);
            }
        }
    }
}
