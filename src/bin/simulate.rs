use cat_typing_duel::collaborators::{Dialog, HeadlessDialog, InputSource, RecordingAudio};
use cat_typing_duel::constants::{
    ALPHABET, CAT_MAX_PREDICT_CHANCE, CAT_MAX_PREDICT_SEC, CAT_MIN_PREDICT_CHANCE,
    CAT_MIN_PREDICT_SEC, MAX_ROUND_SIZE, TICK_RATE, TICK_SEC,
};
use cat_typing_duel::game::Game;
use cat_typing_duel::rng::Rng;
use cat_typing_duel::stage::StageOptions;
use cat_typing_duel::types::{CharacterKind, StageEvent, StageSnapshot};
use chrono::{SecondsFormat, Utc};
use clap::Parser;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

const TYPIST_SEED_SALT: u32 = 0x5eed_7e57;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    single: bool,
    #[arg(long)]
    profile: Option<String>,
    #[arg(long)]
    max_minutes: Option<u32>,
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum TypistProfile {
    Novice,
    Average,
    Expert,
}

impl TypistProfile {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "novice" => Some(Self::Novice),
            "average" => Some(Self::Average),
            "expert" => Some(Self::Expert),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Novice => "novice",
            Self::Average => "average",
            Self::Expert => "expert",
        }
    }

    fn reaction_sec(self) -> f64 {
        match self {
            Self::Novice => 1.4,
            Self::Average => 0.9,
            Self::Expert => 0.45,
        }
    }

    fn accuracy(self) -> f64 {
        match self {
            Self::Novice => 0.7,
            Self::Average => 0.85,
            Self::Expert => 0.97,
        }
    }
}

/// Scripted keyboard: waits its reaction time on each target, then presses
/// either the right key or a wrong one.
struct Typist {
    profile: TypistProfile,
    rng: Rng,
    wait_sec: f64,
    key_is_down: bool,
    key: Option<char>,
    presses: u32,
}

impl Typist {
    fn new(profile: TypistProfile, seed: u32) -> Self {
        Self {
            profile,
            rng: Rng::new(seed ^ TYPIST_SEED_SALT),
            wait_sec: profile.reaction_sec(),
            key_is_down: false,
            key: None,
            presses: 0,
        }
    }

    fn plan(&mut self, target: Option<char>, dt: f64) {
        let Some(target) = target else {
            self.wait_sec = self.profile.reaction_sec();
            return;
        };
        self.wait_sec -= dt;
        if self.wait_sec > 0.0 {
            return;
        }
        self.wait_sec = self.profile.reaction_sec();
        let key = if self.rng.chance(self.profile.accuracy()) {
            target
        } else {
            self.wrong_key(target)
        };
        self.key = Some(key);
        self.key_is_down = true;
        self.presses += 1;
    }

    fn wrong_key(&mut self, target: char) -> char {
        let idx = self.rng.pick_index(ALPHABET.len());
        let key = ALPHABET[idx];
        if key != target {
            return key;
        }
        ALPHABET[(idx + 1) % ALPHABET.len()]
    }
}

impl InputSource for Typist {
    fn is_key_down(&mut self) -> bool {
        let state = self.key_is_down;
        self.key_is_down = false;
        state
    }

    fn pressed_key(&self) -> Option<char> {
        self.key
    }
}

type SimGame = Game<Typist, RecordingAudio, HeadlessDialog>;

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    profile: TypistProfile,
    #[serde(rename = "maxMinutes")]
    max_minutes: u32,
    seed: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum FinishReason {
    FinalLevel,
    TimeLimit,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    profile: TypistProfile,
    reason: FinishReason,
    #[serde(rename = "levelReached")]
    level_reached: u32,
    #[serde(rename = "playMinutes")]
    play_minutes: f64,
    #[serde(rename = "playerScore")]
    player_score: i32,
    #[serde(rename = "catScore")]
    cat_score: i32,
    #[serde(rename = "keyPresses")]
    key_presses: u32,
    correct: u32,
    incorrect: u32,
    rounds: u32,
    #[serde(rename = "playerRoundWins")]
    player_round_wins: u32,
    #[serde(rename = "catRoundWins")]
    cat_round_wins: u32,
    #[serde(rename = "perksActivated")]
    perks_activated: u32,
    #[serde(rename = "bonusLetters")]
    bonus_letters: u32,
    #[serde(rename = "soundsPlayed")]
    sounds_played: usize,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioRunResult {
    #[serde(flatten)]
    result: ScenarioResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
    finished_tick: u64,
    levels: Vec<LevelRecord>,
}

#[derive(Clone, Debug, Serialize)]
struct LevelRecord {
    level: u32,
    #[serde(rename = "roundData")]
    round_data: Vec<CharacterKind>,
    #[serde(rename = "predictTimeSec")]
    predict_time_sec: f64,
    #[serde(rename = "predictChance")]
    predict_chance: f64,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(rename = "generatedAt")]
    generated_at: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageLevel")]
    average_level: f64,
    #[serde(rename = "reasonCounts")]
    reason_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

/// Log lines scoped to one scenario of a run.
struct ScenarioLog<'a> {
    match_id: &'a str,
    scenario: &'a Scenario,
}

impl ScenarioLog<'_> {
    fn emit(&self, level: &str, event: &str, tick: Option<u64>, details: Value) {
        emit_log(
            level,
            event,
            self.match_id,
            Some(&self.scenario.name),
            Some(self.scenario.seed),
            tick,
            details,
        );
    }

    // Level history and anomalies go to stderr; the result line goes to stdout.
    fn report(&self, run: &ScenarioRunResult) {
        for level in &run.levels {
            self.emit(
                "info",
                "level_up",
                None,
                json!({
                    "level": level.level,
                    "roundData": level.round_data,
                    "predictTimeSec": level.predict_time_sec,
                    "predictChance": level.predict_chance,
                }),
            );
        }
        for anomaly in &run.anomaly_records {
            self.emit(
                "warn",
                "anomaly_detected",
                Some(anomaly.tick),
                json!({ "message": anomaly.message }),
            );
        }
        self.emit(
            "info",
            "scenario_finished",
            Some(run.finished_tick),
            json!({
                "reason": run.result.reason,
                "levelReached": run.result.level_reached,
                "playerScore": run.result.player_score,
                "catScore": run.result.cat_score,
                "anomalyCount": run.anomaly_records.len(),
            }),
        );

        match serde_json::to_string(&run.result) {
            Ok(line) => println!("{line}"),
            Err(error) => self.emit(
                "error",
                "result_serialize_failed",
                None,
                json!({ "error": error.to_string() }),
            ),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let scenarios = resolve_scenarios(&cli);
    let run_started_at_ms = now_ms();
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| default_match_id(seed_hint, run_started_at_ms));
    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut reason_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        let log = ScenarioLog {
            match_id: &match_id,
            scenario: &scenario,
        };
        log.emit(
            "info",
            "scenario_started",
            None,
            json!({
                "profile": scenario.profile,
                "maxMinutes": scenario.max_minutes,
            }),
        );
        let scenario_run = run_scenario(&scenario);
        log.report(&scenario_run);

        has_anomaly |= !scenario_run.result.anomalies.is_empty();
        total_anomalies += scenario_run.anomaly_records.len();
        *reason_counts
            .entry(finish_reason_key(scenario_run.result.reason))
            .or_insert(0) += 1;
        scenario_results.push(scenario_run.result);
    }

    let run_finished_at_ms = now_ms();
    let summary = build_run_summary(
        match_id.clone(),
        run_started_at_ms,
        run_finished_at_ms,
        scenario_results,
        reason_counts,
        total_anomalies,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &match_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &match_id,
        None,
        None,
        None,
        json!({
            "scenarioCount": summary.scenario_count,
            "anomalyCount": summary.anomaly_count,
            "averageLevel": summary.average_level,
            "reasonCounts": summary.reason_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn run_scenario(scenario: &Scenario) -> ScenarioRunResult {
    let mut game: SimGame = Game::new(
        StageOptions::default(),
        scenario.seed,
        Typist::new(scenario.profile, scenario.seed),
        RecordingAudio::new(),
        HeadlessDialog::new(),
    );

    let max_ticks = scenario.max_minutes as u64 * 60 * TICK_RATE as u64;
    let mut rounds = 0;
    let mut player_round_wins = 0;
    let mut cat_round_wins = 0;
    let mut perks_activated = 0;
    let mut bonus_letters = 0;
    let mut sounds_played = 0usize;
    let mut levels = Vec::new();
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut last_tick = 0u64;
    let mut reason = FinishReason::TimeLimit;

    while last_tick < max_ticks {
        if game.is_over() {
            reason = FinishReason::FinalLevel;
            break;
        }
        if game.dialog().is_open() {
            game.dialog_mut().hide();
        }

        let target = typist_target(&game);
        game.input_mut().plan(target, TICK_SEC);
        game.frame(TICK_SEC);
        sounds_played += game.audio_mut().drain().len();

        let snapshot = game.build_snapshot(true);
        last_tick = snapshot.tick;
        for message in collect_snapshot_anomalies(&snapshot) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }

        for event in &snapshot.events {
            match event {
                StageEvent::RoundStarted { .. } => rounds += 1,
                StageEvent::RoundEnded {
                    winner: Some(CharacterKind::Player),
                    ..
                } => player_round_wins += 1,
                StageEvent::RoundEnded {
                    winner: Some(CharacterKind::Cat),
                    ..
                } => cat_round_wins += 1,
                StageEvent::PerkActivated { .. } => perks_activated += 1,
                StageEvent::TimeoutWarSpawned { .. } => bonus_letters += 1,
                StageEvent::LevelUp {
                    level,
                    round_data,
                    predict_time_sec,
                    predict_chance,
                } => levels.push(LevelRecord {
                    level: *level,
                    round_data: round_data.clone(),
                    predict_time_sec: *predict_time_sec,
                    predict_chance: *predict_chance,
                }),
                _ => {}
            }
        }
    }
    if game.is_over() {
        reason = FinishReason::FinalLevel;
    }

    let result = game.result();
    let stage = game.stage();
    ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            profile: scenario.profile,
            reason,
            level_reached: stage.level(),
            play_minutes: result.play_time_minutes,
            player_score: result.score,
            cat_score: stage.cat().base.score(),
            key_presses: result.key_presses,
            correct: result.correct,
            incorrect: result.incorrect,
            rounds,
            player_round_wins,
            cat_round_wins,
            perks_activated,
            bonus_letters,
            sounds_played,
            anomalies,
        },
        anomaly_records,
        finished_tick: last_tick,
        levels,
    }
}

// The next sequence letter, or a live bonus letter once the sequence is done.
fn typist_target(game: &SimGame) -> Option<char> {
    let stage = game.stage();
    if let Some(letter) = stage.current_letter(CharacterKind::Player) {
        return Some(letter.glyph);
    }
    stage
        .timeout_war_letters()
        .iter()
        .find(|letter| !letter.is_used)
        .map(|letter| letter.glyph)
}

fn collect_snapshot_anomalies(snapshot: &StageSnapshot) -> Vec<String> {
    let mut anomalies = Vec::new();
    if snapshot.player.score < 0 {
        anomalies.push(format!("negative player score: {}", snapshot.player.score));
    }
    if snapshot.cat.character.score < 0 {
        anomalies.push(format!(
            "negative cat score: {}",
            snapshot.cat.character.score
        ));
    }

    if !snapshot.letters.is_empty() {
        let len = snapshot.letters.len();
        for cursor in [&snapshot.player, &snapshot.cat.character] {
            if cursor.letter_index > len {
                anomalies.push(format!(
                    "{} cursor past sequence: {}/{}",
                    cursor.kind.name(),
                    cursor.letter_index,
                    len
                ));
            }
        }
    }

    let predict_time = snapshot.cat.predict_time_sec;
    if !predict_time.is_finite()
        || !(CAT_MIN_PREDICT_SEC..=CAT_MAX_PREDICT_SEC).contains(&predict_time)
    {
        anomalies.push(format!("cat predict time out of range: {predict_time}"));
    }
    let predict_chance = snapshot.cat.predict_chance;
    if !predict_chance.is_finite()
        || !(CAT_MIN_PREDICT_CHANCE..=CAT_MAX_PREDICT_CHANCE).contains(&predict_chance)
    {
        anomalies.push(format!("cat predict chance out of range: {predict_chance}"));
    }

    if snapshot.round_data.len() > MAX_ROUND_SIZE as usize {
        anomalies.push(format!(
            "round history too long: {}",
            snapshot.round_data.len()
        ));
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli) -> Vec<Scenario> {
    let seed = cli.seed.unwrap_or_else(rand::random::<u32>);
    let max_minutes = cli.max_minutes.unwrap_or(15).clamp(1, 60);
    let profile = cli.profile.as_deref().and_then(TypistProfile::parse);

    if cli.single || profile.is_some() {
        let profile = profile.unwrap_or(TypistProfile::Average);
        return vec![Scenario {
            name: format!("custom-{}", profile.name()),
            profile,
            max_minutes,
            seed,
        }];
    }

    [
        TypistProfile::Novice,
        TypistProfile::Average,
        TypistProfile::Expert,
    ]
    .into_iter()
    .enumerate()
    .map(|(idx, profile)| Scenario {
        name: format!("duel-{}", profile.name()),
        profile,
        max_minutes,
        seed: seed.wrapping_add(idx as u32),
    })
    .collect()
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_match_id(seed: u32, timestamp_ms: u64) -> String {
    format!("duel-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    match_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    scenarios: Vec<ScenarioResultLine>,
    reason_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
) -> RunSummary {
    let scenario_count = scenarios.len();
    let average_level = if scenario_count == 0 {
        0.0
    } else {
        let total: u32 = scenarios.iter().map(|scenario| scenario.level_reached).sum();
        (total as f64 / scenario_count as f64 * 10.0).round() / 10.0
    };
    RunSummary {
        match_id,
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        started_at_ms,
        finished_at_ms,
        scenario_count,
        anomaly_count,
        average_level,
        reason_counts,
        scenarios,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    match_id: &str,
    scenario: Option<&str>,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        match_id: match_id.to_string(),
        scenario: scenario.map(|value| value.to_string()),
        seed,
        tick,
        details,
    };
    if let Ok(line) = serde_json::to_string(&log_line) {
        eprintln!("{line}");
    }
}

fn finish_reason_key(reason: FinishReason) -> String {
    match reason {
        FinishReason::FinalLevel => "final_level",
        FinishReason::TimeLimit => "time_limit",
    }
    .to_string()
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}
