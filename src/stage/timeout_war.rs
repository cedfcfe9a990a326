use super::*;

use crate::constants::{
    TIMEOUT_WAR_CLOSE_SEC, TIMEOUT_WAR_DRIFT_RATE, TIMEOUT_WAR_OPEN_SEC,
    TIMEOUT_WAR_SPAWN_OFFSET_Y,
};

const TIMEOUT_WAR_PERKS: [Perk; 3] = [Perk::Rocket, Perk::Snowflake, Perk::Bomb];

impl Stage {
    /// Spawns a bonus letter while the break timer is inside the war window.
    /// Only one is out at a time; it stays until the next round starts.
    pub(super) fn drive_timeout_war_window(&mut self, scheduler: &StageScheduler) {
        let timer = scheduler.timer(self.round_completed_timer);
        if !timer.is_active()
            || timer.time() > TIMEOUT_WAR_OPEN_SEC
            || timer.time() < TIMEOUT_WAR_CLOSE_SEC
            || !self.timeout_war_letters.is_empty()
        {
            return;
        }
        self.add_timeout_war_letter();
    }

    pub(super) fn add_timeout_war_letter(&mut self) {
        let mut letter = Letter::random(&mut self.rng);
        letter.perk = self.rng.pick(&TIMEOUT_WAR_PERKS).unwrap_or(Perk::Rocket);
        letter.pos = Vector::new(
            self.cat.base.pos.x,
            self.cat.base.pos.y + TIMEOUT_WAR_SPAWN_OFFSET_Y,
        );
        self.events.push(StageEvent::TimeoutWarSpawned {
            glyph: letter.glyph,
            perk: letter.perk,
        });
        self.timeout_war_letters.push(letter);
    }

    pub(super) fn manage_timeout_war(&mut self, dt: f64, ctx: &mut StageContext<'_>) {
        for idx in 0..self.timeout_war_letters.len() {
            let Some(letter) = self.timeout_war_letters.get(idx) else {
                break;
            };
            if letter.is_used {
                continue;
            }
            let glyph = letter.glyph;

            if letter.pos.dist(self.player.pos) < self.player.width {
                self.pick_letter(CharacterKind::Cat, LetterRef::TimeoutWar(idx), true, ctx);
                if let Some(letter) = self.timeout_war_letters.get_mut(idx) {
                    letter.is_used = true;
                }
            }

            if ctx.input.is_key_down() && !self.player.is_frozen {
                let is_correct = ctx.input.pressed_key() == Some(glyph);
                self.pick_letter(
                    CharacterKind::Player,
                    LetterRef::TimeoutWar(idx),
                    is_correct,
                    ctx,
                );
            }

            let player_pos = self.player.pos;
            if let Some(letter) = self.timeout_war_letters.get_mut(idx) {
                letter.pos.lerp(player_pos, TIMEOUT_WAR_DRIFT_RATE * dt);
            }
        }
    }
}
