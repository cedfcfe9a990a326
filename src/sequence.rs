use crate::constants::{LETTER_BOX_PADDING, LETTER_PADDING};
use crate::letter::Letter;
use crate::rng::Rng;
use crate::vector::Rect;

#[derive(Clone, Debug)]
pub struct LetterSequence {
    letters: Vec<Letter>,
    bounding_rect: Rect,
    center_x: f64,
    letter_max_w: f64,
    letter_max_h: f64,
    letter_turn_idx: usize,
}

impl LetterSequence {
    pub fn new(center_x: f64, y: f64) -> Self {
        Self {
            letters: Vec::new(),
            bounding_rect: Rect {
                y,
                ..Rect::default()
            },
            center_x,
            letter_max_w: 0.0,
            letter_max_h: 0.0,
            letter_turn_idx: 0,
        }
    }

    pub fn letters(&self) -> &[Letter] {
        &self.letters
    }

    pub fn get(&self, index: usize) -> Option<&Letter> {
        self.letters.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Letter> {
        self.letters.get_mut(index)
    }

    pub fn last(&self) -> Option<&Letter> {
        self.letters.last()
    }

    pub fn size(&self) -> usize {
        self.letters.len()
    }

    pub fn bounding_rect(&self) -> Rect {
        self.bounding_rect
    }

    pub fn head(&self) -> Option<&Letter> {
        self.letters.get(self.letter_turn_idx)
    }

    pub fn pop_head(&mut self) -> Option<&Letter> {
        let idx = self.letter_turn_idx;
        if idx < self.letters.len() {
            self.letter_turn_idx += 1;
        }
        self.letters.get(idx)
    }

    /// Display-only notion; round completion is decided from the characters' cursors.
    pub fn is_completed(&self) -> bool {
        self.letter_turn_idx >= self.letters.len()
    }

    /// Replaces every letter and lays the row out centred on `center_x`.
    pub fn generate(&mut self, size: usize, rng: &mut Rng) {
        self.letters = (0..size).map(|_| Letter::random(rng)).collect();

        self.letter_max_w = self
            .letters
            .iter()
            .map(|letter| letter.width)
            .fold(0.0, f64::max);
        self.letter_max_h = self
            .letters
            .iter()
            .map(|letter| letter.height)
            .fold(0.0, f64::max);
        let padding = self.letter_max_w + LETTER_PADDING + LETTER_BOX_PADDING;

        self.bounding_rect.width = self
            .letters
            .iter()
            .map(|letter| letter.width + padding)
            .sum();
        self.bounding_rect.height = self.letter_max_h;
        self.bounding_rect.x = self.center_x - (self.bounding_rect.width - padding) / 2.0;

        let mut start_x = self.bounding_rect.x;
        for letter in &mut self.letters {
            letter.pos.set(start_x, self.bounding_rect.y);
            start_x += letter.width + padding;
        }

        self.letter_turn_idx = 0;
    }

    pub fn clear(&mut self) {
        self.letters.clear();
    }
}
