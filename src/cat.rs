use crate::character::Character;
use crate::constants::{
    cat_baseline, CAT_ADAPT_STEP, CAT_MAX_PREDICT_CHANCE, CAT_MAX_PREDICT_SEC,
    CAT_MIN_PREDICT_CHANCE, CAT_MIN_PREDICT_SEC, MAX_ROUND_SIZE,
};
use crate::rng::Rng;
use crate::scheduler::{Scheduler, TimerId};
use crate::types::{CatView, CharacterKind};

/// The adaptive opponent. Its level doubles as the game level.
#[derive(Clone, Debug)]
pub struct Cat {
    pub base: Character,
    level: u32,
    predict_time_sec: f64,
    predict_chance: f64,
    predict_timer: TimerId,
}

impl Cat {
    pub fn new<A, V>(width: f64, scheduler: &mut Scheduler<A, V>) -> Self {
        let mut cat = Self {
            base: Character::new(CharacterKind::Cat, width),
            level: 0,
            predict_time_sec: 1.0,
            predict_chance: 0.5,
            predict_timer: scheduler.create_timer(),
        };
        cat.level_up(&[]);
        cat
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn predict_time_sec(&self) -> f64 {
        self.predict_time_sec
    }

    pub fn predict_chance(&self) -> f64 {
        self.predict_chance
    }

    pub fn predict_timer(&self) -> TimerId {
        self.predict_timer
    }

    /// Reaction gate: true at most once per `predict_time_sec`, re-arming itself.
    pub fn can_predict<A, V>(&self, scheduler: &mut Scheduler<A, V>) -> bool {
        if !scheduler.timer(self.predict_timer).is_timeout() {
            return false;
        }
        scheduler.start_timer(self.predict_timer, self.predict_time_sec);
        true
    }

    pub fn predict(&self, rng: &mut Rng) -> bool {
        rng.chance(self.predict_chance)
    }

    pub fn on_round_start<A, V>(&self, scheduler: &mut Scheduler<A, V>) {
        scheduler.start_timer(self.predict_timer, self.predict_time_sec);
    }

    pub fn level_up(&mut self, round_data: &[CharacterKind]) {
        self.level += 1;

        let (predict_time_sec, predict_chance) = cat_baseline(self.level);
        self.predict_time_sec = predict_time_sec;
        self.predict_chance = predict_chance;

        let player_wins = round_data
            .iter()
            .filter(|winner| **winner == CharacterKind::Player)
            .count();
        let cat_wins = round_data
            .iter()
            .filter(|winner| **winner == CharacterKind::Cat)
            .count();

        if player_wins == MAX_ROUND_SIZE as usize {
            self.predict_time_sec =
                (self.predict_time_sec - CAT_ADAPT_STEP).max(CAT_MIN_PREDICT_SEC);
            self.predict_chance =
                (self.predict_chance + CAT_ADAPT_STEP).min(CAT_MAX_PREDICT_CHANCE);
        } else if cat_wins >= 2 {
            self.predict_time_sec =
                (self.predict_time_sec + CAT_ADAPT_STEP).min(CAT_MAX_PREDICT_SEC);
            self.predict_chance =
                (self.predict_chance - CAT_ADAPT_STEP).max(CAT_MIN_PREDICT_CHANCE);
        }
    }

    pub fn view(&self) -> CatView {
        CatView {
            character: self.base.view(),
            level: self.level,
            predict_time_sec: self.predict_time_sec,
            predict_chance: self.predict_chance,
        }
    }
}
