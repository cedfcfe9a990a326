use crate::constants::{
    ALPHABET, BOMB_CHANCE, LETTER_GLYPH_HEIGHT, LETTER_GLYPH_WIDTH, ROCKET_CHANCE,
    SNOWFLAKE_CHANCE,
};
use crate::rng::Rng;
use crate::types::{CharacterKind, GuessState, LetterView, Perk};
use crate::vector::Vector;

#[derive(Clone, Debug)]
pub struct Letter {
    pub glyph: char,
    pub perk: Perk,
    pub is_used: bool,
    pub pos: Vector,
    pub width: f64,
    pub height: f64,
    owners: Vec<CharacterKind>,
    guess: GuessState,
}

impl Letter {
    pub fn new(glyph: char, perk: Perk) -> Self {
        Self {
            glyph,
            perk,
            is_used: false,
            pos: Vector::ZERO,
            width: LETTER_GLYPH_WIDTH,
            height: LETTER_GLYPH_HEIGHT,
            owners: Vec::new(),
            guess: GuessState::Unknown,
        }
    }

    pub fn random(rng: &mut Rng) -> Self {
        let glyph = rng.pick(&ALPHABET).unwrap_or('A');
        let perk = roll_perk(rng);
        Self::new(glyph, perk)
    }

    /// Records a claim. Owners keep claim order and each side appears once.
    pub fn add_owner(&mut self, owner: CharacterKind, is_correct: bool) {
        if !self.owners.contains(&owner) {
            self.owners.push(owner);
        }
        if owner == CharacterKind::Player {
            self.guess = GuessState::from_correct(is_correct);
        }
    }

    pub fn owners(&self) -> &[CharacterKind] {
        &self.owners
    }

    pub fn first_owner(&self) -> Option<CharacterKind> {
        self.owners.first().copied()
    }

    pub fn player_guess(&self) -> GuessState {
        self.guess
    }

    pub fn score(&self) -> i32 {
        if self.is_used {
            return 1;
        }
        match self.perk {
            Perk::Bomb => -1,
            Perk::Rocket => 0,
            Perk::None | Perk::Snowflake => 1,
        }
    }

    pub fn has_live_perk(&self) -> bool {
        self.perk != Perk::None && !self.is_used
    }

    pub fn view(&self) -> LetterView {
        LetterView {
            glyph: self.glyph,
            perk: self.perk,
            is_used: self.is_used,
            owners: self.owners.clone(),
            guess: self.guess,
            pos: self.pos,
            score: self.score(),
        }
    }
}

// Independent rolls in priority order; the first hit wins.
pub fn roll_perk(rng: &mut Rng) -> Perk {
    if rng.chance(SNOWFLAKE_CHANCE) {
        Perk::Snowflake
    } else if rng.chance(BOMB_CHANCE) {
        Perk::Bomb
    } else if rng.chance(ROCKET_CHANCE) {
        Perk::Rocket
    } else {
        Perk::None
    }
}
