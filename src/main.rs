//! Number Quest entry point
//!
//! Line-driven native front end. Wall-clock time between inputs is fed to the
//! simulation, so the countdown keeps running while you think.
//!
//! Usage: `number-quest [seed]`

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use number_quest::consts::{NUM_HEIGHT, OP_HEIGHT, OPERATOR_COLUMN};
use number_quest::highscores::{HIGHSCORES_FILE, MAX_HIGH_SCORES};
use number_quest::persistence::prefs::PREFS_FILE;
use number_quest::persistence::{
    AnalyticsSink, FeedbackSink, GameSessionSummary, JsonLinesSink, Preferences, SessionContext,
    config_dir,
};
use number_quest::sim::{Command, DrawState, Game, GameEvent, Item, Position, StorageItem};
use number_quest::{Leaderboard, LocalLeaderboard, Settings};

const SETTINGS_FILE: &str = "settings.json";
const SESSIONS_FILE: &str = "sessions.jsonl";
const FEEDBACK_FILE: &str = "feedback.jsonl";
const SETTLE_POLL: Duration = Duration::from_millis(50);

const HELP: &str = "\
commands:
  s <col> <row>   select grid cell (col 0-2)
  t <slot>        select storage slot
  u <slot>        use a timer/refresh item
  r               reset attempt
  p               pause / resume
  d / c           draw reward / claim reward
  l               show leaderboard
  n               new round
  f <message>     send feedback
  h               help
  q               quit";

/// Front end state around the simulation
struct App {
    game: Game,
    last_input: Instant,
    dir: PathBuf,
    prefs: Preferences,
    leaderboard: LocalLeaderboard,
    analytics: JsonLinesSink,
    feedback: JsonLinesSink,
    session: SessionContext,
    /// Game over has been handled (score submitted, session closed)
    recorded: bool,
}

impl App {
    fn new(seed: u64) -> Self {
        let dir = config_dir();
        let settings = Settings::load(&dir.join(SETTINGS_FILE));
        let mut prefs = Preferences::load(&dir.join(PREFS_FILE));
        let mut session = SessionContext::new(prefs.device_id());
        session.start();

        Self {
            game: Game::new(settings, seed),
            last_input: Instant::now(),
            leaderboard: LocalLeaderboard::new(dir.join(HIGHSCORES_FILE)),
            analytics: JsonLinesSink::new(dir.join(SESSIONS_FILE)),
            feedback: JsonLinesSink::new(dir.join(FEEDBACK_FILE)),
            dir,
            prefs,
            session,
            recorded: false,
        }
    }

    /// Feed elapsed wall-clock time to the simulation
    fn catch_up(&mut self) -> Vec<GameEvent> {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_input).as_millis() as u64;
        self.last_input = now;
        self.game.tick(elapsed)
    }

    fn save_prefs(&self) {
        if let Err(e) = self.prefs.save(&self.dir.join(PREFS_FILE)) {
            log::warn!("Failed to save preferences: {}", e);
        }
    }

    fn report(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::SynthesisRejected(err) => println!("! {}", err),
                GameEvent::TargetCleared { target, score_gained, combo } => {
                    println!("* {} cleared! +{} (combo x{})", target.value, score_gained, combo)
                }
                GameEvent::DrawOffered => println!("* Reward draw ready, type `d`"),
                GameEvent::RewardDrawn { reward, slot } => {
                    let new = self.prefs.mark_seen(reward.item.kind());
                    let badge = if new { " [NEW]" } else { "" };
                    match slot {
                        Some(slot) => println!("* Drew {}{} into slot {}", item_label(reward), badge, slot),
                        None if reward.item == Item::Score => println!("* Drew {}{}", item_label(reward), badge),
                        None => println!("* Drew {}{}, but storage is full", item_label(reward), badge),
                    }
                    if new {
                        self.save_prefs();
                    }
                }
                GameEvent::ItemUsed(kind) => println!("* Used {}", kind.as_str()),
                GameEvent::AttemptReset => println!("* Attempt reset"),
                GameEvent::TimeUp => println!("! Time up"),
                GameEvent::RoundStarted { target } => println!("* New round, target {}", target.value),
                _ => {}
            }
        }
    }

    fn render(&self) {
        let snap = self.game.snapshot();
        let round = snap.round;
        println!();
        println!(
            "target {} [{}]   next {} [{}]   score {}   combo {}",
            round.current_target.value,
            snap.difficulty_label,
            round.next_target.value,
            snap.next_difficulty_label,
            round.score,
            round.combo
        );
        let bar = (snap.timer_fraction * 20.0).round() as usize;
        println!(
            "time {:>5.1}s [{}{}]   draw {:>3.0}%",
            snap.timer_remaining_secs,
            "#".repeat(bar),
            ".".repeat(20 - bar.min(20)),
            snap.draw_progress * 100.0
        );
        println!(
            "   next: {:^7} {:^7} {:^7}",
            round.previews.left.as_number().unwrap_or(0),
            "",
            round.previews.right.as_number().unwrap_or(0)
        );

        let selected_op = round.selection.operator();
        let operand = round.selection.operand();
        for row in 0..OP_HEIGHT {
            let mut line = format!("  {} ", row);
            for col in 0..3 {
                let text = if col == OPERATOR_COLUMN {
                    let symbol = round.grid.operator_at(row).map(|op| op.symbol()).unwrap_or(' ');
                    mark(symbol.to_string(), selected_op == Some(row))
                } else if row < NUM_HEIGHT {
                    match round.grid.number_at(col, row) {
                        Some(n) => mark(n.to_string(), operand == Some(Position::grid(col, row))),
                        None => "  .  ".to_string(),
                    }
                } else {
                    "     ".to_string()
                };
                line.push_str(&format!(" {:^7}", text));
            }
            println!("{}", line);
        }

        let slots: Vec<String> = round
            .storage
            .slots()
            .iter()
            .enumerate()
            .map(|(i, slot)| match slot {
                Some(item) => mark(item_label(item), operand == Some(Position::storage(i))),
                None => "-".to_string(),
            })
            .collect();
        println!("storage: {}", slots.join(" | "));

        match round.draw {
            DrawState::Offered => println!("(reward draw open: `d` to draw)"),
            DrawState::Revealed(_) => println!("(reward revealed: `c` to claim)"),
            DrawState::Closed => {}
        }
        if round.is_paused {
            println!("(paused)");
        }
    }

    fn show_leaderboard(&mut self) {
        self.game.set_overlay_open(true);
        let top = self.leaderboard.fetch_top_scores_logged(MAX_HIGH_SCORES);
        println!("--- leaderboard ---");
        if top.is_empty() {
            println!("(no scores yet)");
        }
        for (i, entry) in top.iter().enumerate() {
            println!("{:>2}. {:<16} {}", i + 1, entry.username, entry.score);
        }
        println!("personal best: {}", self.prefs.personal_best);
        self.game.set_overlay_open(false);
    }

    /// Submit the score, update preferences and close the analytics session
    fn finish_round(&mut self, input: &mut impl BufRead) {
        let round = self.game.round();
        let score = round.score;
        let summary = GameSessionSummary::from_round(round);
        println!("\n=== GAME OVER ({:?}) ===", round.end_reason);
        println!("score {}   targets {}   best combo {}", score, round.total_targets_cleared, round.highest_combo);

        if self.prefs.record_score(score) {
            println!("New personal best!");
        }
        if score > 0 {
            let default = self.prefs.last_username.clone().unwrap_or_default();
            print!("name for the leaderboard [{}]: ", default);
            let _ = io::stdout().flush();
            let mut name = String::new();
            if input.read_line(&mut name).is_ok() {
                let name = if name.trim().is_empty() { default } else { name.trim().to_string() };
                self.leaderboard.submit_score_logged(&name, score);
                self.prefs.remember_username(&name);
            }
        }
        self.save_prefs();

        if let Some(record) = self.session.end(summary) {
            self.analytics.record_session_logged(&record);
        }
        self.recorded = true;
        println!("type `n` for a new round or `q` to quit");
    }

    /// Handle one input line. Returns false to quit.
    fn handle(&mut self, line: &str) -> bool {
        let mut parts = line.split_whitespace();
        let Some(cmd) = parts.next() else {
            return true;
        };
        let mut arg = || parts.next().and_then(|s| s.parse::<usize>().ok());

        let command = match cmd {
            "q" => return false,
            "h" => {
                println!("{}", HELP);
                None
            }
            "l" => {
                self.show_leaderboard();
                None
            }
            "f" => {
                let message = line.trim_start().trim_start_matches('f');
                match self.feedback.submit_feedback(message, None) {
                    Ok(()) => println!("thanks for the feedback"),
                    Err(e) => println!("! {}", e),
                }
                None
            }
            "s" => match (arg(), arg()) {
                (Some(col), Some(row)) => Some(Command::SelectCell(Position::grid(col, row))),
                _ => None,
            },
            "t" => arg().map(|i| Command::SelectCell(Position::storage(i))),
            "u" => arg().map(Command::ConsumeStorageItem),
            "r" => Some(Command::ResetAttempt),
            "p" if self.game.round().is_paused => Some(Command::Resume),
            "p" => Some(Command::Pause),
            "d" => Some(Command::RequestDraw),
            "c" => Some(Command::ClaimDraw),
            "n" => Some(Command::StartNewRound),
            _ => {
                println!("unknown command, `h` for help");
                None
            }
        };

        if let Some(command) = command {
            if command == Command::StartNewRound {
                if !self.recorded {
                    // Abandoned round still closes its session
                    let summary = GameSessionSummary::from_round(self.game.round());
                    if let Some(record) = self.session.end(summary) {
                        self.analytics.record_session_logged(&record);
                    }
                }
                self.session.start();
                self.recorded = false;
            }
            let events = self.game.apply(command);
            self.report(&events);
        }
        true
    }
}

fn item_label(item: &StorageItem) -> String {
    match item.item {
        Item::Number(n) => n.to_string(),
        Item::Score => "+score".to_string(),
        Item::Timer => "timer".to_string(),
        Item::Refresh => "refresh".to_string(),
    }
}

fn mark(text: String, selected: bool) -> String {
    if selected { format!("[{}]", text) } else { text }
}

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });
    log::info!("Number Quest starting with seed {}", seed);

    let mut app = App::new(seed);
    if !app.prefs.tutorial_seen {
        println!("Combine two numbers with an operator to hit the target before time runs out.");
        println!("{}", HELP);
        app.prefs.tutorial_seen = true;
        app.save_prefs();
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    app.render();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        let events = app.catch_up();
        app.report(&events);
        if !app.handle(&line) {
            break;
        }
        // Let the resolve lock (and any grace delay) play out before redrawing
        while app.game.round().resolving.is_some() || app.game.round().game_over_pending {
            std::thread::sleep(SETTLE_POLL);
            let events = app.catch_up();
            app.report(&events);
        }

        if app.game.round().is_over && !app.recorded {
            app.finish_round(&mut input);
        }
        app.render();
    }

    if !app.recorded {
        let summary = GameSessionSummary::from_round(app.game.round());
        if let Some(record) = app.session.end(summary) {
            app.analytics.record_session_logged(&record);
        }
    }
    log::info!("Bye");
}
