use crate::collaborators::{AudioSink, Dialog, GameResult, InputSource};
use crate::stage::{Stage, StageContext, StageOptions, StageScheduler};
use crate::types::{HudView, StageSnapshot};

/// Top-level loop: owns the scheduler and feeds it, then the stage, once per frame.
pub struct Game<I, A, D> {
    scheduler: StageScheduler,
    stage: Stage,
    input: I,
    audio: A,
    dialog: D,
    has_focus: bool,
    play_time_sec: f64,
}

impl<I, A, D> Game<I, A, D>
where
    I: InputSource,
    A: AudioSink,
    D: Dialog,
{
    pub fn new(options: StageOptions, seed: u32, input: I, audio: A, dialog: D) -> Self {
        let mut scheduler = StageScheduler::new();
        let stage = Stage::new(options, seed, &mut scheduler);
        Self {
            scheduler,
            stage,
            input,
            audio,
            dialog,
            has_focus: true,
            play_time_sec: 0.0,
        }
    }

    /// One update phase followed by one render phase. Skipped while unfocused.
    pub fn frame(&mut self, dt: f64) {
        if !self.has_focus {
            return;
        }
        self.update(dt);
        self.render();
    }

    pub fn update(&mut self, dt: f64) {
        self.play_time_sec += dt;
        let fired = self.scheduler.advance(dt);

        let Self {
            scheduler,
            stage,
            input,
            audio,
            dialog,
            ..
        } = self;
        let mut ctx = StageContext {
            scheduler,
            input,
            audio,
            dialog,
        };
        for action in fired {
            stage.apply_action(action, &mut ctx);
        }
        stage.on_update(dt, &mut ctx);
    }

    pub fn render(&mut self) {
        self.scheduler.render_frame();
    }

    pub fn set_focus(&mut self, has_focus: bool) {
        self.has_focus = has_focus;
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    /// The final-level dialog never closes, so the session ends there.
    pub fn is_over(&self) -> bool {
        self.stage.is_final_level() && self.dialog.is_open()
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn scheduler(&self) -> &StageScheduler {
        &self.scheduler
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn dialog(&self) -> &D {
        &self.dialog
    }

    pub fn dialog_mut(&mut self) -> &mut D {
        &mut self.dialog
    }

    pub fn play_time_sec(&self) -> f64 {
        self.play_time_sec
    }

    pub fn hud(&self) -> HudView {
        self.stage.hud(&self.scheduler)
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> StageSnapshot {
        self.stage.build_snapshot(&self.scheduler, include_events)
    }

    pub fn result(&self) -> GameResult {
        GameResult::from_store(self.stage.display(), self.play_time_sec)
    }
}
