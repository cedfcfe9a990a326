use serde::Serialize;

use crate::cat::Cat;
use crate::character::{apply_score_delta, Character};
use crate::collaborators::{AudioSink, Dialog, DisplayStore, InputSource};
use crate::constants::{
    level_letter_size, BLOCK_WIDTH_RATIO, CAT_BLOCK_X_OFFSET_RATIO, DEFAULT_CHARACTER_WIDTH,
    DEFAULT_STAGE_HEIGHT, DEFAULT_STAGE_WIDTH, FINAL_LEVEL, MAX_ROUND_SIZE,
    PERK_ICON_BASE_SIZE, PERK_ICON_GROWTH_PER_FRAME, PLAYER_BLOCK_X_RATIO, ROCKET_ARRIVAL_RADIUS,
    ROCKET_FRAME_SEC, ROCKET_SPEED,
};
use crate::letter::Letter;
use crate::rng::Rng;
use crate::scheduler::{Animation, ChronometerId, Scheduler, TimerId};
use crate::sequence::LetterSequence;
use crate::types::{CharacterKind, HudView, Perk, Sound, StageEvent, StageSnapshot};
use crate::vector::Vector;

mod claims;
mod rounds;
mod timeout_war;

pub type StageScheduler = Scheduler<StageAction, PerkAnimation>;

#[derive(Clone, Copy, Debug)]
pub struct StageOptions {
    pub width: f64,
    pub height: f64,
    pub character_width: f64,
}

impl Default for StageOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_STAGE_WIDTH,
            height: DEFAULT_STAGE_HEIGHT,
            character_width: DEFAULT_CHARACTER_WIDTH,
        }
    }
}

/// Deferred work the stage hands to the scheduler.
#[derive(Clone, Debug, PartialEq)]
pub enum StageAction {
    PlaySound(Sound),
    ResolvePerk { perk: Perk, owner: CharacterKind },
    LevelUp,
}

/// Visual state of a running perk effect. It keeps its own copy of every
/// position it needs, so it survives the letter sequence being cleared.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PerkAnimation {
    pub perk: Perk,
    pub owner: CharacterKind,
    pub pos: Vector,
    pub target: Option<Vector>,
    #[serde(rename = "fontSize")]
    pub font_size: f64,
}

impl PerkAnimation {
    fn icon(perk: Perk, owner: CharacterKind, letter: &Letter) -> Self {
        Self {
            perk,
            owner,
            pos: Vector::new(
                letter.pos.x + letter.width * 0.6,
                letter.pos.y - letter.height * 0.75,
            ),
            target: None,
            font_size: PERK_ICON_BASE_SIZE,
        }
    }

    fn rocket(owner: CharacterKind, from: Vector, to: Vector) -> Self {
        Self {
            perk: Perk::Rocket,
            owner,
            pos: from,
            target: Some(to),
            font_size: PERK_ICON_BASE_SIZE,
        }
    }
}

impl Animation for PerkAnimation {
    fn on_frame(&mut self) {
        match self.target {
            Some(target) => {
                if self.pos.dist(target) < ROCKET_ARRIVAL_RADIUS {
                    return;
                }
                let velocity = self.pos.direction_to(target) * (ROCKET_SPEED * ROCKET_FRAME_SEC);
                self.pos = self.pos + velocity;
            }
            None => self.font_size += PERK_ICON_GROWTH_PER_FRAME,
        }
    }
}

pub struct StageContext<'a> {
    pub scheduler: &'a mut StageScheduler,
    pub input: &'a mut dyn InputSource,
    pub audio: &'a mut dyn AudioSink,
    pub dialog: &'a mut dyn Dialog,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LetterRef {
    Sequence(usize),
    TimeoutWar(usize),
}

#[derive(Debug)]
pub struct Stage {
    options: StageOptions,
    rng: Rng,
    letter_sequence: LetterSequence,
    player: Character,
    cat: Cat,
    round_completed_timer: TimerId,
    round_time: ChronometerId,
    level_time: ChronometerId,
    round_data: Vec<CharacterKind>,
    round_winner: Option<CharacterKind>,
    round: u32,
    timeout_war_letters: Vec<Letter>,
    display: DisplayStore,
    events: Vec<StageEvent>,
    tick_counter: u64,
}

impl Stage {
    pub fn new(options: StageOptions, seed: u32, scheduler: &mut StageScheduler) -> Self {
        let mut player = Character::new(CharacterKind::Player, options.character_width);
        let mut cat = Cat::new(options.character_width, scheduler);

        let block_center = options.width * BLOCK_WIDTH_RATIO / 2.0;
        let player_block_x = options.width * PLAYER_BLOCK_X_RATIO;
        let cat_block_x = player_block_x + options.width * CAT_BLOCK_X_OFFSET_RATIO;
        let y = options.height * 0.5 - player.half_width();
        player
            .pos
            .set(player_block_x + block_center - player.half_width(), y);
        let cat_half = cat.base.half_width();
        cat.base
            .pos
            .set(cat_block_x + block_center - cat_half, options.height * 0.5 - cat_half);

        let mut stage = Self {
            options,
            rng: Rng::new(seed),
            letter_sequence: LetterSequence::new(options.width * 0.5, options.height * 0.25),
            player,
            cat,
            round_completed_timer: scheduler.create_timer(),
            round_time: scheduler.create_chronometer(false),
            level_time: scheduler.create_chronometer(false),
            round_data: Vec::new(),
            round_winner: None,
            round: 0,
            timeout_war_letters: Vec::new(),
            display: DisplayStore::new(),
            events: Vec::new(),
            tick_counter: 0,
        };
        stage.update_score();
        stage
    }

    pub fn options(&self) -> StageOptions {
        self.options
    }

    /// The game has no level of its own; it follows the cat's.
    pub fn level(&self) -> u32 {
        self.cat.level()
    }

    pub fn level_letter_size(&self) -> usize {
        level_letter_size(self.level())
    }

    pub fn is_final_level(&self) -> bool {
        self.level() >= FINAL_LEVEL
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn round_data(&self) -> &[CharacterKind] {
        &self.round_data
    }

    pub fn round_winner(&self) -> Option<CharacterKind> {
        self.round_winner
    }

    pub fn player(&self) -> &Character {
        &self.player
    }

    pub fn cat(&self) -> &Cat {
        &self.cat
    }

    pub fn character(&self, kind: CharacterKind) -> &Character {
        match kind {
            CharacterKind::Player => &self.player,
            CharacterKind::Cat => &self.cat.base,
        }
    }

    fn character_mut(&mut self, kind: CharacterKind) -> &mut Character {
        match kind {
            CharacterKind::Player => &mut self.player,
            CharacterKind::Cat => &mut self.cat.base,
        }
    }

    pub fn letter_sequence(&self) -> &LetterSequence {
        &self.letter_sequence
    }

    pub fn timeout_war_letters(&self) -> &[Letter] {
        &self.timeout_war_letters
    }

    pub fn display(&self) -> &DisplayStore {
        &self.display
    }

    pub fn tick(&self) -> u64 {
        self.tick_counter
    }

    /// Letter the given side would claim next, if any remain.
    pub fn current_letter(&self, kind: CharacterKind) -> Option<&Letter> {
        self.letter_sequence
            .get(self.character(kind).letter_index)
    }

    pub fn round_time(&self, scheduler: &StageScheduler) -> f64 {
        scheduler.chronometer(self.round_time).now()
    }

    pub fn level_time(&self, scheduler: &StageScheduler) -> f64 {
        scheduler.chronometer(self.level_time).now()
    }

    pub fn on_update(&mut self, dt: f64, ctx: &mut StageContext<'_>) {
        self.tick_counter += 1;
        if ctx.dialog.is_open() {
            return;
        }

        if self.is_round_completed() {
            self.clear_stage(ctx);
        } else {
            self.check_letter_predicted(ctx);
        }

        if !self.timeout_war_letters.is_empty() {
            self.manage_timeout_war(dt, ctx);
        }
        self.drive_timeout_war_window(ctx.scheduler);
    }

    pub fn apply_action(&mut self, action: StageAction, ctx: &mut StageContext<'_>) {
        match action {
            StageAction::PlaySound(sound) => {
                ctx.audio.play_sound(sound, false);
            }
            StageAction::ResolvePerk { perk, owner } => self.resolve_perk(perk, owner, ctx),
            StageAction::LevelUp => self.on_level_up(ctx),
        }
    }

    fn update_score(&mut self) {
        for kind in [CharacterKind::Player, CharacterKind::Cat] {
            let score = self.character(kind).score();
            self.display.set_score(kind, score);
        }
    }

    fn add_score(&mut self, kind: CharacterKind, delta: i32) {
        apply_score_delta(self.character_mut(kind), delta);
    }

    pub fn hud(&self, scheduler: &StageScheduler) -> HudView {
        let timer = scheduler.timer(self.round_completed_timer);
        let ready_countdown =
            (timer.is_active() && timer.time() > 0.0).then(|| (timer.time() + 1.0) as u32);
        HudView {
            ready_countdown,
            level_time_sec: self.level_time(scheduler) as u32,
            level: self.level(),
            round: self.round,
            max_rounds: MAX_ROUND_SIZE,
            winner_bonus: self
                .round_winner
                .map(|winner| (winner, (self.level_letter_size() / 2) as i32)),
            player_cursor: self
                .is_letter_remain(CharacterKind::Player)
                .then_some(self.player.letter_index),
        }
    }

    pub fn build_snapshot(
        &mut self,
        scheduler: &StageScheduler,
        include_events: bool,
    ) -> StageSnapshot {
        let events = if include_events {
            std::mem::take(&mut self.events)
        } else {
            Vec::new()
        };
        StageSnapshot {
            tick: self.tick_counter,
            level: self.level(),
            round: self.round,
            round_data: self.round_data.clone(),
            round_winner: self.round_winner,
            player: self.player.view(),
            cat: self.cat.view(),
            letters: self.letter_sequence.letters().iter().map(Letter::view).collect(),
            sequence_bounds: self.letter_sequence.bounding_rect(),
            timeout_war: self.timeout_war_letters.iter().map(Letter::view).collect(),
            hud: self.hud(scheduler),
            events,
        }
    }
}

#[cfg(test)]
mod tests;
