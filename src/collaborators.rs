//! Narrow interfaces to the outside world (keyboard, audio, score display,
//! dialog) plus the headless implementations the simulator and tests use.

use serde::Serialize;

use crate::constants::{FINAL_LEVEL, SCORE_GLYPH_WIDTH};
use crate::types::{CharacterKind, Sound};

pub trait InputSource {
    /// Edge-triggered: true at most once per physical press.
    fn is_key_down(&mut self) -> bool;
    fn pressed_key(&self) -> Option<char>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn any(self) -> bool {
        self.ctrl || self.meta || self.shift || self.alt
    }
}

#[derive(Clone, Debug, Default)]
pub struct KeyboardState {
    key_is_down: bool,
    key: Option<char>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `KeyA`..`KeyZ` codes pressed without modifiers; everything else is ignored.
    pub fn key_down(&mut self, code: &str, modifiers: Modifiers) {
        if modifiers.any() {
            return;
        }
        let Some(letter) = code.strip_prefix("Key").and_then(parse_letter) else {
            return;
        };
        self.key = Some(letter);
        self.key_is_down = true;
    }

    pub fn key_up(&mut self) {
        self.key_is_down = false;
    }
}

impl InputSource for KeyboardState {
    fn is_key_down(&mut self) -> bool {
        let state = self.key_is_down;
        self.key_is_down = false;
        state
    }

    fn pressed_key(&self) -> Option<char> {
        self.key
    }
}

fn parse_letter(rest: &str) -> Option<char> {
    let mut chars = rest.chars();
    let letter = chars.next()?;
    if chars.next().is_some() || !letter.is_ascii_alphabetic() {
        return None;
    }
    Some(letter.to_ascii_uppercase())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SoundHandle(u64);

pub trait AudioSink {
    fn play_sound(&mut self, sound: Sound, looped: bool) -> SoundHandle;
    fn stop(&mut self, handle: SoundHandle);
}

#[derive(Clone, Debug, Default)]
pub struct RecordingAudio {
    played: Vec<Sound>,
    looping: Vec<(SoundHandle, Sound)>,
    next_handle: u64,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> &[Sound] {
        &self.played
    }

    pub fn count(&self, sound: Sound) -> usize {
        self.played.iter().filter(|played| **played == sound).count()
    }

    pub fn drain(&mut self) -> Vec<Sound> {
        std::mem::take(&mut self.played)
    }

    pub fn is_looping(&self, sound: Sound) -> bool {
        self.looping.iter().any(|(_, looped)| *looped == sound)
    }
}

impl AudioSink for RecordingAudio {
    fn play_sound(&mut self, sound: Sound, looped: bool) -> SoundHandle {
        self.next_handle += 1;
        let handle = SoundHandle(self.next_handle);
        self.played.push(sound);
        if looped {
            self.looping.push((handle, sound));
        }
        handle
    }

    fn stop(&mut self, handle: SoundHandle) {
        self.looping.retain(|(looping, _)| *looping != handle);
    }
}

pub trait Dialog {
    fn is_open(&self) -> bool;
    fn show(&mut self, level: u32);
}

#[derive(Clone, Debug)]
pub struct HeadlessDialog {
    open: bool,
    level: u32,
    shown: Vec<u32>,
}

impl Default for HeadlessDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDialog {
    /// Opens on the intro message, like the game does before the first round.
    pub fn new() -> Self {
        Self {
            open: true,
            level: 0,
            shown: Vec::new(),
        }
    }

    pub fn is_final(&self) -> bool {
        self.level >= FINAL_LEVEL
    }

    /// The final-level dialog cannot be dismissed.
    pub fn hide(&mut self) -> bool {
        if self.is_final() {
            return false;
        }
        self.open = false;
        true
    }

    pub fn shown_levels(&self) -> &[u32] {
        &self.shown
    }
}

impl Dialog for HeadlessDialog {
    fn is_open(&self) -> bool {
        self.open
    }

    fn show(&mut self, level: u32) {
        self.level = level;
        self.shown.push(level);
        self.open = true;
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DisplayEntry {
    pub score: i32,
    #[serde(rename = "scoreSize")]
    pub score_size: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct: Option<u32>,
    #[serde(rename = "passedLetters", skip_serializing_if = "Option::is_none")]
    pub passed_letters: Option<u32>,
}

/// Values the renderer reads; the stage is the only writer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DisplayStore {
    player: DisplayEntry,
    cat: DisplayEntry,
}

impl Default for DisplayStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayStore {
    pub fn new() -> Self {
        Self {
            player: DisplayEntry {
                correct: Some(0),
                passed_letters: Some(0),
                ..DisplayEntry::default()
            },
            cat: DisplayEntry::default(),
        }
    }

    pub fn entry(&self, kind: CharacterKind) -> &DisplayEntry {
        match kind {
            CharacterKind::Player => &self.player,
            CharacterKind::Cat => &self.cat,
        }
    }

    fn entry_mut(&mut self, kind: CharacterKind) -> &mut DisplayEntry {
        match kind {
            CharacterKind::Player => &mut self.player,
            CharacterKind::Cat => &mut self.cat,
        }
    }

    pub fn set_score(&mut self, kind: CharacterKind, score: i32) {
        let entry = self.entry_mut(kind);
        entry.score = score;
        entry.score_size = measure_score(score);
    }

    pub fn record_player_claim(&mut self, is_correct: bool) {
        let entry = &mut self.player;
        entry.passed_letters = Some(entry.passed_letters.unwrap_or(0) + 1);
        if is_correct {
            entry.correct = Some(entry.correct.unwrap_or(0) + 1);
        }
    }
}

fn measure_score(score: i32) -> f64 {
    score.to_string().chars().count() as f64 * SCORE_GLYPH_WIDTH
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameResult {
    #[serde(rename = "playTimeMinutes")]
    pub play_time_minutes: f64,
    pub score: i32,
    #[serde(rename = "keyPresses")]
    pub key_presses: u32,
    pub correct: u32,
    pub incorrect: u32,
}

impl GameResult {
    pub fn from_store(store: &DisplayStore, play_time_sec: f64) -> Self {
        let player = store.entry(CharacterKind::Player);
        let key_presses = player.passed_letters.unwrap_or(0);
        let correct = player.correct.unwrap_or(0);
        Self {
            play_time_minutes: (play_time_sec / 60.0 * 10.0).round() / 10.0,
            score: player.score,
            key_presses,
            correct,
            incorrect: key_presses.saturating_sub(correct),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        vec![
            "Statistics:".to_string(),
            format!("Playing time: {:.1} minutes.", self.play_time_minutes),
            format!("Your score: {}", self.score),
            format!("Number of keys pressed: {}", self.key_presses),
            format!("Number of keys pressed correctly: {}", self.correct),
            format!("Number of keys pressed incorrectly: {}", self.incorrect),
            format!(
                "Don't forget to share your score: {} ({}/{}/{})",
                self.score, self.correct, self.incorrect, self.key_presses
            ),
        ]
    }
}
