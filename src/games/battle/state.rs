//! Eco Battle Quiz game state: data structures and static tables, no logic.

use std::collections::BTreeSet;

use super::questions::QuestionBank;
use super::round::QuestionRound;

// ── Tunables ──────────────────────────────────────────────────

/// Player hearts at the start of every battle.
pub const MAX_PLAYER_HP: u32 = 3;

/// Experience awarded per correct answer, regardless of difficulty.
pub const EXP_PER_CORRECT: u32 = 50;

/// Experience needed per level (level = exp / 100 + 1).
pub const EXP_PER_LEVEL: u32 = 100;

/// Consecutive correct answers needed to promote the difficulty.
pub const PROMOTION_STREAK: u32 = 3;

/// Game ticks per real-time second (matches the clock in main.rs).
pub const TICKS_PER_SEC: u32 = 10;

/// Log entries kept for display.
pub const MAX_LOG: usize = 30;

// ── Themes ────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Theme {
    AlienSpecies,
    Energy,
}

/// All themes in stage-select order.
pub const ALL_THEMES: [Theme; 2] = [Theme::AlienSpecies, Theme::Energy];

impl Theme {
    /// Stable key used by the question bank and localStorage.
    pub fn key(self) -> &'static str {
        match self {
            Theme::AlienSpecies => "alienspecies",
            Theme::Energy => "energy",
        }
    }

    pub fn from_key(key: &str) -> Option<Theme> {
        ALL_THEMES.iter().copied().find(|t| t.key() == key)
    }
}

/// Stage-select card text for a theme.
pub struct ThemeInfo {
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

pub fn theme_info(theme: Theme) -> ThemeInfo {
    match theme {
        Theme::AlienSpecies => ThemeInfo {
            title: "外来生物の森",
            description: "外来生物について学ぼう！",
            icon: "🌿",
        },
        Theme::Energy => ThemeInfo {
            title: "エネルギーの街",
            description: "再生可能エネルギーについて学ぼう！",
            icon: "⚡",
        },
    }
}

// ── Difficulty ────────────────────────────────────────────────

/// Adaptive difficulty ladder, ordered EASY < NORMAL < HARD.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

pub const ALL_DIFFICULTIES: [Difficulty; 3] =
    [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

impl Difficulty {
    pub fn key(self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Normal => "NORMAL",
            Difficulty::Hard => "HARD",
        }
    }

    pub fn from_key(key: &str) -> Option<Difficulty> {
        ALL_DIFFICULTIES.iter().copied().find(|d| d.key() == key)
    }

    pub fn base_score(self) -> u32 {
        match self {
            Difficulty::Easy => 100,
            Difficulty::Normal => 200,
            Difficulty::Hard => 300,
        }
    }

    /// One step up; HARD stays HARD.
    pub fn promoted(self) -> Difficulty {
        match self {
            Difficulty::Easy => Difficulty::Normal,
            Difficulty::Normal | Difficulty::Hard => Difficulty::Hard,
        }
    }

    /// One step down; EASY stays EASY.
    pub fn demoted(self) -> Difficulty {
        match self {
            Difficulty::Hard => Difficulty::Normal,
            Difficulty::Normal | Difficulty::Easy => Difficulty::Easy,
        }
    }
}

// ── Job titles ────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum JobTitle {
    Explorer,
    Ranger,
    Guardian,
    Champion,
    Hero,
}

pub struct JobRank {
    pub min_level: u32,
    pub title: JobTitle,
    pub name: &'static str,
}

/// Job ladder. Must stay sorted by `min_level` ascending.
pub static JOB_PROGRESSION: [JobRank; 5] = [
    JobRank { min_level: 1, title: JobTitle::Explorer, name: "自然の探検家" },
    JobRank { min_level: 11, title: JobTitle::Ranger, name: "エコ・レンジャー" },
    JobRank { min_level: 21, title: JobTitle::Guardian, name: "地球の守護者" },
    JobRank { min_level: 31, title: JobTitle::Champion, name: "環境チャンピオン" },
    JobRank { min_level: 41, title: JobTitle::Hero, name: "プラネット・ヒーロー" },
];

// ── Stages & monsters ─────────────────────────────────────────

#[allow(dead_code)] // difficulty / base_* are catalogue data; monsters are pinned to 1
pub struct Stage {
    pub id: u32,
    pub name: &'static str,
    pub theme: Theme,
    pub difficulty: Difficulty,
    pub monster_count: u32,
    pub base_monster_hp: u32,
    pub base_monster_attack: u32,
}

pub static STAGES: [Stage; 2] = [
    Stage {
        id: 1,
        name: "ステージ1: 外来生物の森",
        theme: Theme::AlienSpecies,
        difficulty: Difficulty::Normal,
        monster_count: 10,
        base_monster_hp: 1,
        base_monster_attack: 1,
    },
    Stage {
        id: 2,
        name: "ステージ2: エネルギーの街",
        theme: Theme::Energy,
        difficulty: Difficulty::Normal,
        monster_count: 10,
        base_monster_hp: 1,
        base_monster_attack: 1,
    },
];

pub fn monster_names(theme: Theme) -> &'static [&'static str] {
    match theme {
        Theme::AlienSpecies => &["ゴミモンスター", "リサイクル妖怪", "ポイ捨て鬼"],
        Theme::Energy => &["生物滅亡獣", "自然破壊竜", "生態系怪物"],
    }
}

pub const MONSTER_ICONS: [&str; 5] = ["👹", "👺", "🧌", "🐉", "👻"];

#[derive(Clone, Debug, PartialEq)]
pub struct Monster {
    /// `monster-{stage_id}-{index}`
    pub id: String,
    pub name: &'static str,
    pub max_hp: u32,
    pub current_hp: u32,
    pub attack_power: u32,
    pub icon: &'static str,
}

impl Monster {
    pub fn is_defeated(&self) -> bool {
        self.current_hp == 0
    }
}

// ── Player & battle ───────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerStats {
    pub level: u32,
    pub experience: u32,
    pub attack_power: u32,
    /// Cached from `level`; never set independently.
    pub job_title: JobTitle,
}

impl PlayerStats {
    pub fn new() -> Self {
        Self {
            level: 1,
            experience: 0,
            attack_power: 1,
            job_title: JobTitle::Explorer,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BattleState {
    pub stage_id: u32,
    pub monster_index: u32,
    pub current_monster: Option<Monster>,
    pub player_hp: u32,
    pub max_player_hp: u32,
    pub player_stats: PlayerStats,
    pub questions_answered: u32,
    pub correct_answers: u32,
    pub total_score: u32,
    pub used_question_ids: BTreeSet<String>,
    pub current_difficulty: Difficulty,
    pub consecutive_correct_answers: u32,
}

impl BattleState {
    pub fn new(stage_id: u32) -> Self {
        Self {
            stage_id,
            monster_index: 0,
            current_monster: None,
            player_hp: MAX_PLAYER_HP,
            max_player_hp: MAX_PLAYER_HP,
            player_stats: PlayerStats::new(),
            questions_answered: 0,
            correct_answers: 0,
            total_score: 0,
            used_question_ids: BTreeSet::new(),
            current_difficulty: Difficulty::Easy,
            consecutive_correct_answers: 0,
        }
    }
}

/// Where a battle stands. Both terminals are absorbing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BattlePhase {
    Active,
    StageClear,
    GameOver,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    pub selected_theme: Option<Theme>,
    pub current_stage: u32,
    pub current_battle: BattleState,
    pub game_over: bool,
    pub stage_clear: bool,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            selected_theme: None,
            current_stage: 1,
            current_battle: BattleState::new(1),
            game_over: false,
            stage_clear: false,
        }
    }

    pub fn phase(&self) -> BattlePhase {
        if self.stage_clear {
            BattlePhase::StageClear
        } else if self.game_over {
            BattlePhase::GameOver
        } else {
            BattlePhase::Active
        }
    }
}

// ── Presentation state ────────────────────────────────────────

/// Active screen within the quiz game.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Screen {
    StageSelect,
    Battle,
    Result,
}

/// Everything the quiz game owns: the battle core plus the current
/// question round, log, and the bundled question bank.
pub struct QuizState {
    pub screen: Screen,
    pub game: GameState,
    pub round: Option<QuestionRound>,
    /// Theme read from / written to persistent storage.
    pub stored_theme: Option<Theme>,
    pub bank: Option<QuestionBank>,
    pub rng_seed: u64,
    pub log: Vec<String>,
}

impl QuizState {
    pub fn new(bank: Option<QuestionBank>) -> Self {
        Self {
            screen: Screen::StageSelect,
            game: GameState::new(),
            round: None,
            stored_theme: None,
            bank,
            rng_seed: 0x2545_f491_4f6c_dd1d,
            log: Vec::new(),
        }
    }

    pub fn add_log(&mut self, text: &str) {
        self.log.push(text.to_string());
        if self.log.len() > MAX_LOG {
            self.log.remove(0);
        }
    }
}
