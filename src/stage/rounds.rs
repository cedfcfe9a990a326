use super::*;

use crate::constants::{LETTER_CLEAR_AFTER_SEC, LEVEL_UP_DELAY_SEC, ROUND_COMPLETE_BREAK_SEC};
use crate::types::GuessState;

impl Stage {
    pub fn is_round_completed(&self) -> bool {
        !self.is_letter_remain(CharacterKind::Player) && !self.is_letter_remain(CharacterKind::Cat)
    }

    pub(super) fn clear_stage(&mut self, ctx: &mut StageContext<'_>) {
        ctx.scheduler.stop_chronometer(self.round_time, false);

        let timer = ctx.scheduler.timer(self.round_completed_timer);
        if !timer.is_active() {
            self.on_end_round(ctx.scheduler);
        } else if timer.is_timeout() {
            self.on_start_round(ctx.scheduler);
        } else if timer.time() < ROUND_COMPLETE_BREAK_SEC - LETTER_CLEAR_AFTER_SEC {
            self.letter_sequence.clear();
        }
    }

    pub(super) fn on_end_round(&mut self, scheduler: &mut StageScheduler) {
        let round = self.round;
        if self.round > MAX_ROUND_SIZE - 1 {
            scheduler.delay(LEVEL_UP_DELAY_SEC, StageAction::LevelUp);
            self.round = 0;
        } else {
            scheduler.start_timer(self.round_completed_timer, ROUND_COMPLETE_BREAK_SEC);
        }

        // Round 0 means the level-up delay already reset the count; this call only
        // restarts the break and must not report the round a second time.
        let finished = round > 0;

        let Some(last) = self.letter_sequence.last() else {
            return;
        };
        // Round outcome follows whoever claimed the last letter first. An unclaimed
        // last letter means nobody takes the round.
        let Some(fastest) = last.first_owner() else {
            if !finished {
                return;
            }
            self.events.push(StageEvent::RoundEnded {
                round,
                fastest: None,
                winner: None,
                correct_count: 0,
            });
            return;
        };

        if self.round_data.len() < MAX_ROUND_SIZE as usize {
            self.round_data.push(fastest);
        }

        let correct_count = self
            .letter_sequence
            .letters()
            .iter()
            .filter(|letter| {
                let player_correct = letter.player_guess() == GuessState::Correct;
                match fastest {
                    CharacterKind::Player => player_correct,
                    CharacterKind::Cat => !player_correct,
                }
            })
            .count();

        let winner = (correct_count >= self.level_letter_size() / 2).then_some(fastest);
        if winner.is_some() {
            self.round_winner = winner;
        }
        if !finished {
            return;
        }

        self.events.push(StageEvent::RoundEnded {
            round,
            fastest: Some(fastest),
            winner,
            correct_count,
        });
    }

    pub(super) fn on_start_round(&mut self, scheduler: &mut StageScheduler) {
        let size = self.level_letter_size();
        self.letter_sequence.generate(size, &mut self.rng);

        let mut bonus_to = None;
        let mut bonus_points = 0;
        if let Some(winner) = self.round_winner.take() {
            bonus_points = (size / 2) as i32;
            bonus_to = Some(winner);
            self.add_score(winner, bonus_points);
            self.update_score();
        }

        if self.round == 0 {
            scheduler.start_chronometer(self.level_time);
        }
        self.round += 1;

        self.player.letter_index = 0;
        self.cat.base.letter_index = 0;
        self.timeout_war_letters.clear();

        self.cat.on_round_start(scheduler);
        scheduler.start_chronometer(self.round_time);

        self.events.push(StageEvent::RoundStarted {
            level: self.level(),
            round: self.round,
            letters: size,
            bonus_to,
            bonus_points,
        });
    }

    pub(super) fn on_level_up(&mut self, ctx: &mut StageContext<'_>) {
        ctx.scheduler.stop_chronometer(self.level_time, true);
        self.cat.level_up(&self.round_data);

        ctx.dialog.show(self.level());

        self.events.push(StageEvent::LevelUp {
            level: self.level(),
            round_data: std::mem::take(&mut self.round_data),
            predict_time_sec: self.cat.predict_time_sec(),
            predict_chance: self.cat.predict_chance(),
        });
        self.letter_sequence.clear();
    }
}
