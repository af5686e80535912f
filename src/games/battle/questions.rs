//! Question bank: parsing the bundled quiz JSON and picking questions.

use std::collections::{BTreeSet, HashSet};

use serde::Deserialize;
use thiserror::Error;

use super::state::{Difficulty, Theme};

/// Quiz data bundled into the binary at build time.
const BUNDLED_QUIZZES: &str = include_str!("../../../assets/quizzes.json");

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("クイズデータの解析に失敗: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("問題 {id}: 不明なテーマ `{theme}`")]
    UnknownTheme { id: String, theme: String },
    #[error("問題 {id}: 不明な難易度 `{difficulty}`")]
    UnknownDifficulty { id: String, difficulty: String },
    #[error("問題 {id}: {reason}")]
    InvalidQuestion { id: String, reason: &'static str },
    #[error("問題IDが重複しています: {0}")]
    DuplicateId(String),
}

// ── Wire format ───────────────────────────────────────────────

#[derive(Deserialize)]
struct QuizFile {
    questions: Vec<RawQuestion>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    id: String,
    theme: String,
    difficulty: String,
    question: String,
    options: Vec<String>,
    correct_answer: usize,
    feedback: Feedback,
    time_limit: u32,
    base_score: u32,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    image_source: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Feedback {
    pub correct: String,
    pub incorrect: String,
}

// ── Validated model ───────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct QuizQuestion {
    pub id: String,
    pub theme: Theme,
    pub difficulty: Difficulty,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub feedback: Feedback,
    /// Seconds, always > 0.
    pub time_limit: u32,
    pub base_score: u32,
    pub image: Option<String>,
    pub image_source: Option<String>,
}

impl QuizQuestion {
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_answer
    }
}

impl TryFrom<RawQuestion> for QuizQuestion {
    type Error = QuizError;

    fn try_from(raw: RawQuestion) -> Result<Self, QuizError> {
        let theme = Theme::from_key(&raw.theme).ok_or_else(|| QuizError::UnknownTheme {
            id: raw.id.clone(),
            theme: raw.theme.clone(),
        })?;
        let difficulty =
            Difficulty::from_key(&raw.difficulty).ok_or_else(|| QuizError::UnknownDifficulty {
                id: raw.id.clone(),
                difficulty: raw.difficulty.clone(),
            })?;
        if raw.options.is_empty() {
            return Err(QuizError::InvalidQuestion { id: raw.id, reason: "選択肢がありません" });
        }
        if raw.correct_answer >= raw.options.len() {
            return Err(QuizError::InvalidQuestion { id: raw.id, reason: "正解の番号が範囲外です" });
        }
        if raw.time_limit == 0 {
            return Err(QuizError::InvalidQuestion { id: raw.id, reason: "制限時間が0秒です" });
        }

        Ok(QuizQuestion {
            id: raw.id,
            theme,
            difficulty,
            question: raw.question,
            options: raw.options,
            correct_answer: raw.correct_answer,
            feedback: raw.feedback,
            time_limit: raw.time_limit,
            base_score: raw.base_score,
            image: raw.image,
            image_source: raw.image_source,
        })
    }
}

pub struct QuestionBank {
    questions: Vec<QuizQuestion>,
}

impl QuestionBank {
    pub fn from_json(json: &str) -> Result<Self, QuizError> {
        let file: QuizFile = serde_json::from_str(json)?;
        let mut seen = HashSet::new();
        let mut questions = Vec::with_capacity(file.questions.len());
        for raw in file.questions {
            if !seen.insert(raw.id.clone()) {
                return Err(QuizError::DuplicateId(raw.id));
            }
            questions.push(QuizQuestion::try_from(raw)?);
        }
        Ok(Self { questions })
    }

    /// Parse the quiz file compiled into the binary.
    pub fn bundled() -> Result<Self, QuizError> {
        Self::from_json(BUNDLED_QUIZZES)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, id: &str) -> Option<&QuizQuestion> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// All questions for a theme and difficulty, ignoring exclusions.
    pub fn pool(&self, theme: Theme, difficulty: Difficulty) -> Vec<&QuizQuestion> {
        self.questions
            .iter()
            .filter(|q| q.theme == theme && q.difficulty == difficulty)
            .collect()
    }

    /// Pick a question for `theme`/`difficulty`, preferring ones not in
    /// `used`. Falls back to the full pool when every candidate was used.
    /// `roll` picks the index within whichever pool is chosen.
    pub fn select(
        &self,
        theme: Theme,
        difficulty: Difficulty,
        used: &BTreeSet<String>,
        roll: u64,
    ) -> Option<&QuizQuestion> {
        let pool = self.pool(theme, difficulty);
        let fresh: Vec<&QuizQuestion> = pool
            .iter()
            .copied()
            .filter(|q| !used.contains(&q.id))
            .collect();
        let candidates = if fresh.is_empty() { pool } else { fresh };
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[(roll % candidates.len() as u64) as usize])
    }
}
