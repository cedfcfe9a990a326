pub const TICK_RATE: u32 = 60;
pub const TICK_SEC: f64 = 1.0 / TICK_RATE as f64;

pub const ALPHABET: [char; 25] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y',
];

pub const MAX_ROUND_SIZE: u32 = 3;
pub const FINAL_LEVEL: u32 = 11;
pub const ROUND_COMPLETE_BREAK_SEC: f64 = 3.0;
pub const LETTER_CLEAR_AFTER_SEC: f64 = 2.0;
pub const LEVEL_UP_DELAY_SEC: f64 = 2.0;
pub const CAT_REACTION_GRACE_SEC: f64 = 1.0;

pub const MIN_LETTERS_PER_ROUND: usize = 2;
pub const MAX_LETTERS_PER_ROUND: usize = 10;

// Break-timer window (remaining seconds) in which timeout-war letters live.
pub const TIMEOUT_WAR_OPEN_SEC: f64 = 2.0;
pub const TIMEOUT_WAR_CLOSE_SEC: f64 = 1.0;
pub const TIMEOUT_WAR_SPAWN_OFFSET_Y: f64 = 32.0;
pub const TIMEOUT_WAR_DRIFT_RATE: f64 = 1.0;

pub const SNOWFLAKE_CHANCE: f64 = 0.25;
pub const BOMB_CHANCE: f64 = 0.2;
pub const ROCKET_CHANCE: f64 = 0.1;

pub const PERK_SOUND_DELAY_SEC: f64 = 1.0;
pub const PERK_ANIMATION_SEC: f64 = 2.0;
pub const PERK_ICON_BASE_SIZE: f64 = 1.0;
pub const PERK_ICON_GROWTH_PER_FRAME: f64 = 0.04;
pub const ROCKET_SPEED: f64 = 300.0;
pub const ROCKET_FRAME_SEC: f64 = 0.016;
pub const ROCKET_ARRIVAL_RADIUS: f64 = 10.0;

pub const CAT_BASE_PREDICT_SEC: f64 = 1.0;
pub const CAT_PREDICT_SEC_STEP: f64 = 0.08;
pub const CAT_BASELINE_MIN_PREDICT_SEC: f64 = 0.5;
pub const CAT_BASE_PREDICT_CHANCE: f64 = 0.5;
pub const CAT_PREDICT_CHANCE_STEP: f64 = 0.07;
pub const CAT_BASELINE_MAX_PREDICT_CHANCE: f64 = 0.95;
pub const CAT_ADAPT_STEP: f64 = 0.1;
pub const CAT_MIN_PREDICT_SEC: f64 = 0.3;
pub const CAT_MAX_PREDICT_SEC: f64 = 2.0;
pub const CAT_MIN_PREDICT_CHANCE: f64 = 0.3;
pub const CAT_MAX_PREDICT_CHANCE: f64 = 1.0;

pub const DEFAULT_STAGE_WIDTH: f64 = 800.0;
pub const DEFAULT_STAGE_HEIGHT: f64 = 450.0;
pub const DEFAULT_CHARACTER_WIDTH: f64 = 32.0;
pub const BLOCK_WIDTH_RATIO: f64 = 0.2;
pub const PLAYER_BLOCK_X_RATIO: f64 = 0.15;
pub const CAT_BLOCK_X_OFFSET_RATIO: f64 = 0.5;

// Metrics of the monospace faces the renderer uses ("2rem" letters, "1.2rem" scores).
pub const LETTER_GLYPH_WIDTH: f64 = 19.2;
pub const LETTER_GLYPH_HEIGHT: f64 = 22.0;
pub const LETTER_PADDING: f64 = 5.0;
pub const LETTER_BOX_PADDING: f64 = 10.0;
pub const SCORE_GLYPH_WIDTH: f64 = 11.52;

pub fn level_letter_size(level: u32) -> usize {
    (level as usize + 1).clamp(MIN_LETTERS_PER_ROUND, MAX_LETTERS_PER_ROUND)
}

/// Cat reaction time and accuracy before round-history adjustments.
pub fn cat_baseline(level: u32) -> (f64, f64) {
    let level = level as f64;
    let predict_sec = (CAT_BASE_PREDICT_SEC - level * CAT_PREDICT_SEC_STEP)
        .max(CAT_BASELINE_MIN_PREDICT_SEC);
    let predict_chance = (CAT_BASE_PREDICT_CHANCE + level * CAT_PREDICT_CHANCE_STEP)
        .min(CAT_BASELINE_MAX_PREDICT_CHANCE);
    (predict_sec, predict_chance)
}
