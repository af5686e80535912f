//! Semantic action IDs for Eco Battle Quiz click targets.

// ── Stage select ──────────────────────────────────────────────
/// Theme card base: + index into `ALL_THEMES`.
pub const THEME_BASE: u16 = 10;
/// Start a battle with the stored theme.
pub const START_STORED: u16 = 20;

// ── Battle ────────────────────────────────────────────────────
/// Answer option base: + option index (0-based). So [1] = OPTION_BASE+0.
pub const OPTION_BASE: u16 = 30;
/// Dismiss the feedback panel (次へ / 結果を見る).
pub const CONTINUE: u16 = 50;
/// Retry loading a question after the bank came up empty.
pub const RETRY_QUESTION: u16 = 51;
/// Abandon the battle and return to stage select.
pub const RETREAT: u16 = 52;

// ── Result ────────────────────────────────────────────────────
pub const PLAY_AGAIN: u16 = 60;
pub const BACK_TO_STAGES: u16 = 61;
