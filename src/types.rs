use serde::Serialize;

use crate::vector::{Rect, Vector};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterKind {
    Player,
    Cat,
}

impl CharacterKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Cat => "cat",
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Cat,
            Self::Cat => Self::Player,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Perk {
    None,
    Bomb,
    Rocket,
    Snowflake,
}

impl Perk {
    pub fn emoji(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Bomb => Some("\u{1F4A3}"),
            Self::Rocket => Some("\u{1F680}"),
            Self::Snowflake => Some("\u{2744}"),
        }
    }

    pub fn sound(self) -> Option<Sound> {
        match self {
            Self::None => None,
            Self::Bomb => Some(Sound::Bomb),
            Self::Rocket => Some(Sound::Rocket),
            Self::Snowflake => Some(Sound::Snowflake),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuessState {
    #[default]
    Unknown,
    Correct,
    Incorrect,
}

impl GuessState {
    pub fn from_correct(is_correct: bool) -> Self {
        if is_correct {
            Self::Correct
        } else {
            Self::Incorrect
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sound {
    PickUp,
    FalsePickUp,
    CatPickUp,
    Bomb,
    Rocket,
    Snowflake,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterSlot {
    Sequence,
    TimeoutWar,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StageEvent {
    LetterClaimed {
        by: CharacterKind,
        glyph: char,
        correct: bool,
        perk: Perk,
        slot: LetterSlot,
    },
    PerkActivated {
        perk: Perk,
        claimant: CharacterKind,
        beneficiary: CharacterKind,
    },
    PerkResolved {
        perk: Perk,
        owner: CharacterKind,
    },
    TimeoutWarSpawned {
        glyph: char,
        perk: Perk,
    },
    RoundEnded {
        round: u32,
        fastest: Option<CharacterKind>,
        winner: Option<CharacterKind>,
        correct_count: usize,
    },
    RoundStarted {
        level: u32,
        round: u32,
        letters: usize,
        bonus_to: Option<CharacterKind>,
        bonus_points: i32,
    },
    LevelUp {
        level: u32,
        round_data: Vec<CharacterKind>,
        predict_time_sec: f64,
        predict_chance: f64,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct CharacterView {
    pub kind: CharacterKind,
    pub pos: Vector,
    pub score: i32,
    #[serde(rename = "letterIndex")]
    pub letter_index: usize,
    #[serde(rename = "isFrozen")]
    pub is_frozen: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct CatView {
    #[serde(flatten)]
    pub character: CharacterView,
    pub level: u32,
    #[serde(rename = "predictTimeSec")]
    pub predict_time_sec: f64,
    #[serde(rename = "predictChance")]
    pub predict_chance: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct LetterView {
    pub glyph: char,
    pub perk: Perk,
    #[serde(rename = "isUsed")]
    pub is_used: bool,
    pub owners: Vec<CharacterKind>,
    pub guess: GuessState,
    pub pos: Vector,
    pub score: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HudView {
    #[serde(rename = "readyCountdown")]
    pub ready_countdown: Option<u32>,
    #[serde(rename = "levelTimeSec")]
    pub level_time_sec: u32,
    pub level: u32,
    pub round: u32,
    #[serde(rename = "maxRounds")]
    pub max_rounds: u32,
    #[serde(rename = "winnerBonus")]
    pub winner_bonus: Option<(CharacterKind, i32)>,
    #[serde(rename = "playerCursor")]
    pub player_cursor: Option<usize>,
}

#[derive(Clone, Debug, Serialize)]
pub struct StageSnapshot {
    pub tick: u64,
    pub level: u32,
    pub round: u32,
    #[serde(rename = "roundData")]
    pub round_data: Vec<CharacterKind>,
    #[serde(rename = "roundWinner")]
    pub round_winner: Option<CharacterKind>,
    pub player: CharacterView,
    pub cat: CatView,
    pub letters: Vec<LetterView>,
    #[serde(rename = "sequenceBounds")]
    pub sequence_bounds: Rect,
    #[serde(rename = "timeoutWar")]
    pub timeout_war: Vec<LetterView>,
    pub hud: HudView,
    pub events: Vec<StageEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opponent_is_an_involution() {
        for kind in [CharacterKind::Player, CharacterKind::Cat] {
            assert_ne!(kind.opponent(), kind);
            assert_eq!(kind.opponent().opponent(), kind);
        }
    }

    #[test]
    fn only_real_perks_have_icons_and_sounds() {
        assert_eq!(Perk::None.emoji(), None);
        assert_eq!(Perk::None.sound(), None);
        assert_eq!(Perk::Rocket.sound(), Some(Sound::Rocket));
        assert!(Perk::Snowflake.emoji().is_some());
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = StageEvent::PerkResolved {
            perk: Perk::Rocket,
            owner: CharacterKind::Cat,
        };
        let value = serde_json::to_value(&event).expect("event should serialize");
        assert_eq!(value["type"], "perk_resolved");
        assert_eq!(value["perk"], "rocket");
        assert_eq!(value["owner"], "cat");
    }
}
