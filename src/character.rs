use crate::types::{CharacterKind, CharacterView};
use crate::vector::Vector;

#[derive(Clone, Debug)]
pub struct Character {
    kind: CharacterKind,
    pub pos: Vector,
    pub width: f64,
    pub letter_index: usize,
    pub is_frozen: bool,
    score: i32,
}

impl Character {
    pub fn new(kind: CharacterKind, width: f64) -> Self {
        Self {
            kind,
            pos: Vector::ZERO,
            width,
            letter_index: 0,
            is_frozen: false,
            score: 0,
        }
    }

    pub fn kind(&self) -> CharacterKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    /// Scores never go below zero.
    pub fn set_score(&mut self, score: i32) {
        self.score = score.max(0);
    }

    pub fn view(&self) -> CharacterView {
        CharacterView {
            kind: self.kind,
            pos: self.pos,
            score: self.score,
            letter_index: self.letter_index,
            is_frozen: self.is_frozen,
        }
    }
}

pub fn apply_score_delta(character: &mut Character, delta: i32) {
    let next = character.score.saturating_add(delta);
    character.set_score(next);
}
