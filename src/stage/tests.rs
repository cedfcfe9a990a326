use super::*;
use crate::collaborators::{HeadlessDialog, KeyboardState, Modifiers, RecordingAudio};
use crate::constants::TICK_SEC;
use crate::types::{GuessState, LetterSlot};

struct Harness {
    scheduler: StageScheduler,
    stage: Stage,
    keyboard: KeyboardState,
    audio: RecordingAudio,
    dialog: HeadlessDialog,
}

impl Harness {
    fn new(seed: u32) -> Self {
        let mut scheduler = StageScheduler::new();
        let stage = Stage::new(StageOptions::default(), seed, &mut scheduler);
        let mut dialog = HeadlessDialog::new();
        dialog.hide();
        Self {
            scheduler,
            stage,
            keyboard: KeyboardState::new(),
            audio: RecordingAudio::new(),
            dialog,
        }
    }

    /// A started round whose letters are all plain and spell out `glyphs`.
    fn with_round(seed: u32, glyphs: &str) -> Self {
        let mut harness = Self::new(seed);
        harness.stage.on_start_round(&mut harness.scheduler);
        let size = harness.stage.letter_sequence.size();
        assert_eq!(size, glyphs.chars().count());
        for (idx, glyph) in glyphs.chars().enumerate() {
            harness.set_letter(idx, glyph, Perk::None);
        }
        harness.events();
        harness
    }

    fn set_letter(&mut self, idx: usize, glyph: char, perk: Perk) {
        let letter = self
            .stage
            .letter_sequence
            .get_mut(idx)
            .expect("letter exists");
        letter.glyph = glyph;
        letter.perk = perk;
    }

    fn with_ctx<R>(&mut self, f: impl FnOnce(&mut Stage, &mut StageContext<'_>) -> R) -> R {
        let mut ctx = StageContext {
            scheduler: &mut self.scheduler,
            input: &mut self.keyboard,
            audio: &mut self.audio,
            dialog: &mut self.dialog,
        };
        f(&mut self.stage, &mut ctx)
    }

    fn step(&mut self) {
        let fired = self.scheduler.advance(TICK_SEC);
        self.with_ctx(|stage, ctx| {
            for action in fired {
                stage.apply_action(action, ctx);
            }
            stage.on_update(TICK_SEC, ctx);
        });
    }

    fn step_for(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.step();
        }
    }

    fn update_only(&mut self) {
        self.with_ctx(|stage, ctx| stage.on_update(TICK_SEC, ctx));
    }

    fn press(&mut self, glyph: char) {
        self.keyboard
            .key_down(&format!("Key{glyph}"), Modifiers::default());
    }

    fn finish_round(&mut self) {
        let size = self.stage.letter_sequence.size();
        self.stage.player.letter_index = size;
        self.stage.cat.base.letter_index = size;
    }

    fn events(&mut self) -> Vec<StageEvent> {
        self.stage.build_snapshot(&self.scheduler, true).events
    }
}

#[test]
fn stage_starts_idle_at_level_one() {
    let harness = Harness::new(1);
    assert_eq!(harness.stage.level(), 1);
    assert_eq!(harness.stage.round(), 0);
    assert_eq!(harness.stage.letter_sequence().size(), 0);
    assert!(harness.stage.is_round_completed());
    assert!(harness.stage.player().pos.x < harness.stage.cat().base.pos.x);
}

#[test]
fn round_completes_only_when_both_cursors_reach_the_end() {
    let mut harness = Harness::with_round(2, "AB");
    assert!(!harness.stage.is_round_completed());

    harness.stage.player.letter_index = 2;
    assert!(!harness.stage.is_round_completed());

    harness.stage.cat.base.letter_index = 1;
    assert!(!harness.stage.is_round_completed());

    harness.stage.cat.base.letter_index = 2;
    assert!(harness.stage.is_round_completed());
}

#[test]
fn start_round_generates_level_sized_sequence() {
    let mut harness = Harness::new(3);
    harness.stage.on_start_round(&mut harness.scheduler);
    assert_eq!(harness.stage.round(), 1);
    assert_eq!(harness.stage.letter_sequence().size(), 2);
    assert_eq!(harness.stage.player().letter_index, 0);
    assert_eq!(harness.stage.cat().base.letter_index, 0);
    assert!(harness.events().iter().any(|event| matches!(
        event,
        StageEvent::RoundStarted {
            level: 1,
            round: 1,
            letters: 2,
            bonus_to: None,
            bonus_points: 0,
        }
    )));
}

#[test]
fn correct_key_claims_and_scores() {
    let mut harness = Harness::with_round(4, "QW");
    harness.press('Q');
    harness.step();

    assert_eq!(harness.stage.player().letter_index, 1);
    assert_eq!(harness.stage.player().score(), 1);
    assert_eq!(harness.stage.display().entry(CharacterKind::Player).score, 1);
    assert_eq!(harness.audio.played(), &[Sound::PickUp]);
    let first = harness.stage.letter_sequence().get(0).expect("letter");
    assert_eq!(first.owners(), &[CharacterKind::Player]);
    assert_eq!(first.player_guess(), GuessState::Correct);
}

#[test]
fn wrong_key_still_advances_without_score() {
    let mut harness = Harness::with_round(5, "QW");
    harness.press('Z');
    harness.step();

    assert_eq!(harness.stage.player().letter_index, 1);
    assert_eq!(harness.stage.player().score(), 0);
    assert_eq!(harness.audio.played(), &[Sound::FalsePickUp]);
    let first = harness.stage.letter_sequence().get(0).expect("letter");
    assert_eq!(first.player_guess(), GuessState::Incorrect);
    let display = harness.stage.display().entry(CharacterKind::Player);
    assert_eq!(display.passed_letters, Some(1));
    assert_eq!(display.correct, Some(0));
}

#[test]
fn cat_waits_out_the_reaction_grace() {
    let mut harness = Harness::with_round(6, "AB");
    harness.scheduler.advance(0.5);
    harness.update_only();
    assert_eq!(harness.stage.cat().base.letter_index, 0);

    harness.scheduler.advance(1.0);
    harness.update_only();
    assert_eq!(harness.stage.cat().base.letter_index, 1);
    assert_eq!(harness.audio.played(), &[Sound::CatPickUp]);
}

#[test]
fn player_claim_takes_priority_over_cat_in_same_tick() {
    let mut harness = Harness::with_round(7, "AB");
    harness.scheduler.advance(1.5);

    harness.press('A');
    harness.update_only();
    assert_eq!(harness.stage.player().letter_index, 1);
    assert_eq!(harness.stage.cat().base.letter_index, 0);

    harness.update_only();
    assert_eq!(harness.stage.cat().base.letter_index, 1);
    let first = harness.stage.letter_sequence().get(0).expect("letter");
    assert_eq!(first.owners(), &[CharacterKind::Player, CharacterKind::Cat]);
}

#[test]
fn bomb_costs_a_point_and_explodes_later() {
    let mut harness = Harness::with_round(8, "AB");
    harness.stage.cat.base.is_frozen = true;
    harness.set_letter(0, 'A', Perk::Bomb);
    harness.stage.player.set_score(3);

    harness.press('A');
    harness.step();
    assert_eq!(harness.stage.player().score(), 2);
    assert!(harness.stage.letter_sequence().get(0).expect("letter").is_used);
    assert_eq!(harness.audio.count(Sound::Bomb), 0);

    harness.step_for(130);
    assert_eq!(harness.audio.count(Sound::Bomb), 1);
    assert_eq!(harness.stage.display().entry(CharacterKind::Player).score, 2);
    assert!(harness
        .events()
        .iter()
        .any(|event| matches!(event, StageEvent::PerkResolved { perk: Perk::Bomb, .. })));
}

#[test]
fn bomb_on_zero_score_is_clamped() {
    let mut harness = Harness::with_round(9, "AB");
    harness.stage.cat.base.is_frozen = true;
    harness.set_letter(0, 'A', Perk::Bomb);

    harness.press('A');
    harness.step();
    assert_eq!(harness.stage.player().score(), 0);
}

#[test]
fn snowflake_freezes_claimant_until_resolved() {
    let mut harness = Harness::with_round(10, "AB");
    harness.stage.cat.base.is_frozen = true;
    harness.set_letter(0, 'A', Perk::Snowflake);

    harness.press('A');
    harness.step();
    assert!(harness.stage.player().is_frozen);
    assert_eq!(harness.stage.player().score(), 1);

    harness.press('B');
    harness.step();
    assert_eq!(harness.stage.player().letter_index, 1);

    harness.step_for(130);
    assert!(!harness.stage.player().is_frozen);
    assert_eq!(harness.audio.count(Sound::Snowflake), 1);

    harness.press('B');
    harness.step();
    assert_eq!(harness.stage.player().letter_index, 2);
}

#[test]
fn rocket_hits_the_opponent_after_the_flight() {
    let mut harness = Harness::with_round(11, "AB");
    harness.stage.cat.base.is_frozen = true;
    harness.stage.cat.base.set_score(5);
    harness.set_letter(0, 'A', Perk::Rocket);

    harness.press('A');
    harness.step();
    assert_eq!(harness.stage.player().score(), 0);
    assert_eq!(harness.stage.cat().base.score(), 5);
    let rocket = harness.scheduler.animations().next().expect("rocket in flight");
    assert_eq!(rocket.owner, CharacterKind::Cat);
    assert!(rocket.target.is_some());

    let events = harness.events();
    assert!(events.iter().any(|event| matches!(
        event,
        StageEvent::PerkActivated {
            perk: Perk::Rocket,
            claimant: CharacterKind::Player,
            beneficiary: CharacterKind::Cat,
        }
    )));

    harness.step_for(130);
    assert_eq!(harness.stage.cat().base.score(), 4);
    assert_eq!(harness.stage.display().entry(CharacterKind::Cat).score, 4);
    assert_eq!(harness.audio.count(Sound::Rocket), 1);
    assert_eq!(harness.scheduler.animations().count(), 0);
}

#[test]
fn rocket_resolves_after_the_sequence_is_cleared() {
    let mut harness = Harness::with_round(24, "AB");
    harness.stage.cat.base.is_frozen = true;
    harness.stage.cat.base.set_score(5);
    harness.set_letter(0, 'A', Perk::Rocket);

    harness.press('A');
    harness.step();
    harness.stage.letter_sequence.clear();
    assert_eq!(harness.stage.letter_sequence().size(), 0);

    harness.step_for(130);
    assert_eq!(harness.stage.cat().base.score(), 4);
    assert_eq!(harness.scheduler.animations().count(), 0);
}

#[test]
fn player_sweep_wins_the_round() {
    let mut harness = Harness::with_round(12, "AB");
    harness.stage.cat.base.is_frozen = true;
    harness.press('A');
    harness.step();
    harness.press('B');
    harness.step();
    harness.stage.cat.base.letter_index = 2;
    harness.events();

    harness.step();
    assert_eq!(harness.stage.round_data(), &[CharacterKind::Player]);
    assert_eq!(harness.stage.round_winner(), Some(CharacterKind::Player));
    assert!(harness.events().iter().any(|event| matches!(
        event,
        StageEvent::RoundEnded {
            round: 1,
            fastest: Some(CharacterKind::Player),
            winner: Some(CharacterKind::Player),
            correct_count: 2,
        }
    )));
    assert!(harness.stage.hud(&harness.scheduler).ready_countdown.is_some());
}

#[test]
fn round_data_follows_first_claimant_of_last_letter() {
    // The player got every letter right, but the cat reached the last one first.
    let mut harness = Harness::with_round(13, "AB");
    for idx in 0..2 {
        let letter = harness.stage.letter_sequence.get_mut(idx).expect("letter");
        if idx == 1 {
            letter.add_owner(CharacterKind::Cat, true);
        }
        letter.add_owner(CharacterKind::Player, true);
    }
    harness.finish_round();

    harness.step();
    assert_eq!(harness.stage.round_data(), &[CharacterKind::Cat]);
    assert_eq!(harness.stage.round_winner(), None);
    assert!(harness.events().iter().any(|event| matches!(
        event,
        StageEvent::RoundEnded {
            fastest: Some(CharacterKind::Cat),
            winner: None,
            correct_count: 0,
            ..
        }
    )));
}

#[test]
fn unclaimed_last_letter_has_no_winner() {
    let mut harness = Harness::with_round(14, "AB");
    harness.finish_round();

    harness.step();
    assert!(harness.stage.round_data().is_empty());
    assert_eq!(harness.stage.round_winner(), None);
    assert!(harness.events().iter().any(|event| matches!(
        event,
        StageEvent::RoundEnded {
            fastest: None,
            winner: None,
            ..
        }
    )));
}

#[test]
fn round_winner_collects_bonus_on_next_round() {
    let mut harness = Harness::new(15);
    harness.stage.round_winner = Some(CharacterKind::Cat);
    harness.stage.on_start_round(&mut harness.scheduler);

    assert_eq!(harness.stage.cat().base.score(), 1);
    assert_eq!(harness.stage.display().entry(CharacterKind::Cat).score, 1);
    assert_eq!(harness.stage.round_winner(), None);
    assert!(harness.events().iter().any(|event| matches!(
        event,
        StageEvent::RoundStarted {
            bonus_to: Some(CharacterKind::Cat),
            bonus_points: 1,
            ..
        }
    )));
}

#[test]
fn break_clears_letters_then_starts_next_round() {
    let mut harness = Harness::with_round(16, "AB");
    harness.finish_round();
    harness.step();
    assert_eq!(harness.stage.letter_sequence().size(), 2);

    harness.step_for(150);
    assert_eq!(harness.stage.letter_sequence().size(), 0);
    assert_eq!(harness.stage.round(), 1);

    harness.step_for(40);
    assert_eq!(harness.stage.round(), 2);
    assert_eq!(harness.stage.letter_sequence().size(), 2);
    assert!(!harness.stage.is_round_completed());
}

#[test]
fn third_round_triggers_level_up_dialog() {
    let mut harness = Harness::with_round(17, "AB");
    harness.stage.round = MAX_ROUND_SIZE;
    harness
        .stage
        .letter_sequence
        .get_mut(1)
        .expect("letter")
        .add_owner(CharacterKind::Player, true);
    harness.finish_round();

    harness.step();
    assert_eq!(harness.stage.round(), 0);
    assert_eq!(harness.stage.level(), 1);

    harness.step_for(130);
    assert_eq!(harness.stage.level(), 2);
    assert!(harness.dialog.is_open());
    assert_eq!(harness.dialog.shown_levels(), &[2]);
    assert!(harness.stage.round_data().is_empty());
    assert_eq!(harness.stage.letter_sequence().size(), 0);
    assert!(harness.events().iter().any(|event| matches!(
        event,
        StageEvent::LevelUp { level: 2, round_data, .. }
            if round_data.first() == Some(&CharacterKind::Player)
    )));

    harness.dialog.hide();
    harness.step_for(120);
    assert_eq!(harness.stage.round(), 1);
    assert_eq!(harness.stage.letter_sequence().size(), 3);
}

fn round_ended_events(harness: &mut Harness) -> Vec<StageEvent> {
    harness
        .events()
        .into_iter()
        .filter(|event| matches!(event, StageEvent::RoundEnded { .. }))
        .collect()
}

#[test]
fn level_ending_round_is_reported_once() {
    let mut harness = Harness::with_round(25, "AB");
    harness.stage.cat.base.is_frozen = true;
    harness.stage.round = MAX_ROUND_SIZE;
    harness.press('A');
    harness.step();
    harness.press('B');
    harness.step();
    harness.stage.cat.base.letter_index = 2;

    harness.step_for(5);
    let ended = round_ended_events(&mut harness);
    assert_eq!(ended.len(), 1);
    assert!(matches!(
        ended[0],
        StageEvent::RoundEnded {
            round: 3,
            fastest: Some(CharacterKind::Player),
            winner: Some(CharacterKind::Player),
            ..
        }
    ));

    harness.step_for(130);
    assert_eq!(harness.stage.level(), 2);
    assert!(round_ended_events(&mut harness).is_empty());
}

#[test]
fn player_sweep_makes_the_cat_harder() {
    let mut harness = Harness::new(18);
    harness.stage.round_data = vec![CharacterKind::Player; 3];
    harness.with_ctx(|stage, ctx| stage.on_level_up(ctx));

    let cat = harness.stage.cat();
    assert_eq!(cat.level(), 2);
    assert!((cat.predict_time_sec() - 0.74).abs() < 1e-9);
    assert!((cat.predict_chance() - 0.74).abs() < 1e-9);
}

#[test]
fn timeout_war_letter_spawns_in_window_and_player_can_take_it() {
    let mut harness = Harness::with_round(19, "AB");
    harness.finish_round();
    harness.step();
    assert!(harness.stage.timeout_war_letters().is_empty());

    harness.step_for(30);
    assert!(harness.stage.timeout_war_letters().is_empty());

    harness.step_for(50);
    assert_eq!(harness.stage.timeout_war_letters().len(), 1);
    let letter = harness.stage.timeout_war_letters()[0].clone();
    assert!(letter.perk != Perk::None);
    assert!(letter.pos.x > harness.stage.player().pos.x);
    let events = harness.events();
    assert!(events
        .iter()
        .any(|event| matches!(event, StageEvent::TimeoutWarSpawned { .. })));

    harness.press(letter.glyph);
    harness.step();
    assert_eq!(harness.stage.player().letter_index, 2);
    assert!(harness.stage.timeout_war_letters()[0].is_used);
    assert!(harness.events().iter().any(|event| matches!(
        event,
        StageEvent::LetterClaimed {
            by: CharacterKind::Player,
            correct: true,
            slot: LetterSlot::TimeoutWar,
            ..
        }
    )));

    harness.step_for(120);
    assert_eq!(harness.stage.round(), 2);
    assert!(harness.stage.timeout_war_letters().is_empty());
}

#[test]
fn frozen_player_cannot_take_war_letters() {
    let mut harness = Harness::with_round(20, "AB");
    harness.finish_round();
    harness.step_for(81);
    let glyph = harness.stage.timeout_war_letters()[0].glyph;

    harness.stage.player.is_frozen = true;
    harness.press(glyph);
    harness.step();
    assert!(harness.stage.timeout_war_letters()[0].owners().is_empty());
}

#[test]
fn drifting_war_letter_is_taken_by_the_cat() {
    let mut harness = Harness::with_round(21, "AB");
    harness.finish_round();
    harness.step_for(81);
    let player_pos = harness.stage.player().pos;
    harness.stage.timeout_war_letters[0].pos = player_pos.offset(4.0);

    harness.step();
    let letter = &harness.stage.timeout_war_letters()[0];
    assert!(letter.is_used);
    assert_eq!(letter.owners(), &[CharacterKind::Cat]);
}

#[test]
fn dialog_pauses_the_stage() {
    let mut harness = Harness::with_round(22, "AB");
    harness.dialog.show(1);
    harness.press('A');
    harness.step();
    assert_eq!(harness.stage.player().letter_index, 0);
    assert_eq!(harness.stage.tick(), 1);
}

#[test]
fn snapshot_drains_events_once() {
    let mut harness = Harness::with_round(23, "AB");
    harness.press('A');
    harness.step();

    let snapshot = harness.stage.build_snapshot(&harness.scheduler, false);
    assert!(snapshot.events.is_empty());
    assert_eq!(snapshot.letters.len(), 2);
    assert_eq!(harness.events().len(), 1);
    assert!(harness.events().is_empty());
}
