use super::*;

use crate::constants::{CAT_REACTION_GRACE_SEC, PERK_ANIMATION_SEC, PERK_SOUND_DELAY_SEC};
use crate::types::LetterSlot;

impl Stage {
    // At most one claim per tick; the player is checked first so a tie goes to the human.
    pub(super) fn check_letter_predicted(&mut self, ctx: &mut StageContext<'_>) {
        let mut claim: Option<(CharacterKind, bool)> = None;

        if self.is_letter_remain(CharacterKind::Player)
            && ctx.input.is_key_down()
            && !self.player.is_frozen
        {
            let is_correct = match (
                self.current_letter(CharacterKind::Player),
                ctx.input.pressed_key(),
            ) {
                (Some(letter), Some(key)) => letter.glyph == key,
                _ => false,
            };
            claim = Some((CharacterKind::Player, is_correct));
        } else if self.is_letter_remain(CharacterKind::Cat)
            && ctx.scheduler.chronometer(self.round_time).now() > CAT_REACTION_GRACE_SEC
            && !self.cat.base.is_frozen
            && self.cat.can_predict(ctx.scheduler)
        {
            claim = Some((CharacterKind::Cat, self.cat.predict(&mut self.rng)));
        }

        if let Some((kind, is_correct)) = claim {
            let idx = self.character(kind).letter_index;
            self.pick_letter(kind, LetterRef::Sequence(idx), is_correct, ctx);
        }
    }

    pub(super) fn is_letter_remain(&self, kind: CharacterKind) -> bool {
        self.character(kind).letter_index < self.letter_sequence.size()
    }

    fn letter_mut(&mut self, target: LetterRef) -> Option<&mut Letter> {
        match target {
            LetterRef::Sequence(idx) => self.letter_sequence.get_mut(idx),
            LetterRef::TimeoutWar(idx) => self.timeout_war_letters.get_mut(idx),
        }
    }

    pub(super) fn pick_letter(
        &mut self,
        kind: CharacterKind,
        target: LetterRef,
        is_correct: bool,
        ctx: &mut StageContext<'_>,
    ) {
        let Some(letter) = self.letter_mut(target) else {
            return;
        };
        letter.add_owner(kind, is_correct);
        let (glyph, perk, score, has_live_perk) =
            (letter.glyph, letter.perk, letter.score(), letter.has_live_perk());

        // Bonus letters are not part of the sequence, so they never move a cursor.
        let slot = match target {
            LetterRef::Sequence(_) => {
                self.character_mut(kind).letter_index += 1;
                LetterSlot::Sequence
            }
            LetterRef::TimeoutWar(_) => LetterSlot::TimeoutWar,
        };

        match kind {
            CharacterKind::Player => {
                self.display.record_player_claim(is_correct);
                let sound = if is_correct {
                    Sound::PickUp
                } else {
                    Sound::FalsePickUp
                };
                ctx.audio.play_sound(sound, false);
            }
            CharacterKind::Cat => {
                ctx.audio.play_sound(Sound::CatPickUp, false);
            }
        }
        self.events.push(StageEvent::LetterClaimed {
            by: kind,
            glyph,
            correct: is_correct,
            perk,
            slot,
        });

        if !is_correct {
            return;
        }

        self.add_score(kind, score);

        if !has_live_perk {
            self.update_score();
            return;
        }

        self.activate_perk(target, kind, ctx);
    }

    pub(super) fn activate_perk(
        &mut self,
        target: LetterRef,
        claimant: CharacterKind,
        ctx: &mut StageContext<'_>,
    ) {
        let Some(letter) = self.letter_mut(target) else {
            return;
        };
        letter.is_used = true;
        let letter = letter.clone();
        let perk = letter.perk;

        // A rocket flies at the claimant's opponent.
        let owner = match perk {
            Perk::Rocket => claimant.opponent(),
            _ => claimant,
        };
        if perk == Perk::Snowflake {
            self.character_mut(owner).is_frozen = true;
        }

        if perk != Perk::Bomb {
            if let Some(sound) = perk.sound() {
                ctx.scheduler
                    .delay(PERK_SOUND_DELAY_SEC, StageAction::PlaySound(sound));
            }
        }

        let animation = match perk {
            Perk::Rocket => {
                let target_character = self.character(owner);
                let to = target_character.pos.offset(target_character.half_width());
                PerkAnimation::rocket(owner, letter.pos, to)
            }
            _ => PerkAnimation::icon(perk, owner, &letter),
        };
        ctx.scheduler.loop_for(
            PERK_ANIMATION_SEC,
            animation,
            Some(StageAction::ResolvePerk { perk, owner }),
        );

        self.events.push(StageEvent::PerkActivated {
            perk,
            claimant,
            beneficiary: owner,
        });
    }

    pub(super) fn resolve_perk(
        &mut self,
        perk: Perk,
        owner: CharacterKind,
        ctx: &mut StageContext<'_>,
    ) {
        match perk {
            Perk::Bomb | Perk::Snowflake => {
                self.character_mut(owner).is_frozen = false;
                self.update_score();
                if perk == Perk::Bomb {
                    ctx.audio.play_sound(Sound::Bomb, false);
                }
            }
            Perk::Rocket => {
                self.add_score(owner, -1);
                self.update_score();
            }
            Perk::None => return,
        }
        self.events.push(StageEvent::PerkResolved { perk, owner });
    }
}
