use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use rustyline::Editor;
use rustyline::history::DefaultHistory;

use mirror_application::{CalibrationUseCase, bootstrap};
use mirror_core::config::PlaceholderConfig;
use mirror_core::placeholder::PlaceholderAnimator;
use mirror_core::session::{SessionState, StartRejection};
use mirror_infrastructure::{ConfigService, MirrorPaths, logging};

mod helper;
mod render;

use helper::CliHelper;

const PLAYBACK_POLL_INTERVAL: Duration = Duration::from_millis(500);
const PLACEHOLDER_PAUSED_POLL: Duration = Duration::from_millis(250);
const PLACEHOLDER_MIN_TICK: Duration = Duration::from_millis(10);

/// One line of REPL input.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Calibrate(&'a str),
    Back,
    History(Option<usize>),
    Books,
    Tracks,
    Play(Option<usize>),
    Ambient,
    Stop,
    Help,
    Quit,
    Invalid(String),
}

fn parse_command(line: &str) -> Command<'_> {
    let trimmed = line.trim();
    if trimmed == "quit" || trimmed == "exit" {
        return Command::Quit;
    }
    if !trimmed.starts_with('/') {
        return Command::Calibrate(trimmed);
    }

    let mut parts = trimmed.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();

    let position = |arg: Option<&str>| -> std::result::Result<Option<usize>, String> {
        match arg {
            None => Ok(None),
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(Some(n - 1)),
                _ => Err(format!("Expected a number from 1, got '{raw}'")),
            },
        }
    };

    match name {
        "/back" => Command::Back,
        "/history" => position(arg).map_or_else(Command::Invalid, Command::History),
        "/books" => Command::Books,
        "/tracks" => Command::Tracks,
        "/play" => position(arg).map_or_else(Command::Invalid, Command::Play),
        "/ambient" => Command::Ambient,
        "/stop" => Command::Stop,
        "/help" => Command::Help,
        other => Command::Invalid(format!("Unknown command {other}. Type /help for commands.")),
    }
}

fn rejection_message(rejection: StartRejection) -> &'static str {
    match rejection {
        StartRejection::BlankInput => "Describe what is on your mind first.",
        StartRejection::InFlight => "The mirror is still calibrating. Please wait.",
        StartRejection::ResultShowing => "A reflection is on display. Type /back first.",
    }
}

fn prompt(state: &SessionState) -> &'static str {
    match state {
        SessionState::Loading { .. } => "⧗ ",
        SessionState::Ready { .. } => "◉ ",
        SessionState::Idle | SessionState::Failed { .. } => ">> ",
    }
}

/// Drives the placeholder animation while the session waits for input.
fn spawn_placeholder(
    usecase: Arc<CalibrationUseCase>,
    config: &PlaceholderConfig,
    text: Arc<RwLock<String>>,
) -> tokio::task::JoinHandle<()> {
    let mut animator = PlaceholderAnimator::new(config.phrases.clone(), config.timing());

    tokio::spawn(async move {
        loop {
            let state = usecase.state().await;
            let delay = if state.is_loading() || state.is_ready() {
                if let Ok(mut slot) = text.write() {
                    slot.clear();
                }
                PLACEHOLDER_PAUSED_POLL
            } else {
                let frame = animator.tick();
                if let Ok(mut slot) = text.write() {
                    *slot = frame.text;
                }
                frame.next_delay
            };
            tokio::time::sleep(delay.max(PLACEHOLDER_MIN_TICK)).await;
        }
    })
}

/// Reports sources that stopped on their own.
fn spawn_playback_poller(usecase: Arc<CalibrationUseCase>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PLAYBACK_POLL_INTERVAL);
        loop {
            interval.tick().await;
            if let Some(state) = usecase.poll_playback().await {
                render::playback(&state);
            }
        }
    })
}

async fn handle(usecase: &Arc<CalibrationUseCase>, command: Command<'_>) {
    match command {
        Command::Calibrate(text) => {
            println!("{}", format!("> {}", text).green());
            // Accept or reject before returning to the prompt, so the next
            // snapshot already shows `Loading`.
            match usecase.begin(text).await {
                Ok(input_text) => {
                    let usecase = Arc::clone(usecase);
                    tokio::spawn(async move {
                        render::state(&usecase.finish(&input_text).await);
                    });
                }
                Err(rejection) => println!("{}", rejection_message(rejection).yellow()),
            }
        }
        Command::Back => {
            let state = usecase.reset().await;
            if state.is_loading() {
                println!("{}", rejection_message(StartRejection::InFlight).yellow());
            }
        }
        Command::History(None) => render::history(&usecase.history().await),
        Command::History(Some(index)) => match usecase.history().await.get(index) {
            Some(item) => render::history_item(item),
            None => println!("{}", "No such history entry.".yellow()),
        },
        Command::Books => render::books(usecase.catalog()),
        Command::Tracks => render::tracks(usecase.catalog(), &usecase.playback_state().await),
        Command::Play(Some(index)) => match usecase.play_track_at(index).await {
            Some(state) => render::playback(&state),
            None => println!("{}", "No such track. Type /tracks to list them.".yellow()),
        },
        Command::Play(None) => match usecase.play_recommended().await {
            Some(state) => render::playback(&state),
            None => println!("{}", "No recommendation on display. Try /play <n>.".yellow()),
        },
        Command::Ambient => render::playback(&usecase.toggle_ambient().await),
        Command::Stop => render::playback(&usecase.stop_all().await),
        Command::Help => render::help(),
        Command::Invalid(message) => println!("{}", message.yellow()),
        Command::Quit => {}
    }
}

/// The main entry point for the mirror REPL.
///
/// Calibrations run on background tasks so the prompt stays responsive;
/// the session itself refuses a second submission while one is pending.
#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = match MirrorPaths::logs_dir().and_then(|dir| logging::init_file_logging(&dir)) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("{}", format!("File logging disabled: {}", e).yellow());
            None
        }
    };

    let app = bootstrap(&ConfigService::new()?)?;
    let usecase = Arc::clone(&app.usecase);
    tracing::info!(model = %app.config.model, "REPL started");

    let placeholder = Arc::new(RwLock::new(String::new()));
    let placeholder_task = spawn_placeholder(
        Arc::clone(&usecase),
        &app.config.placeholder,
        Arc::clone(&placeholder),
    );
    let poller_task = spawn_playback_poller(Arc::clone(&usecase));

    let mut rl: Editor<CliHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(CliHelper::new(placeholder)));

    println!("{}", "=== Quantum Mirror ===".bright_magenta().bold());
    println!(
        "{}",
        "Describe what weighs on you, type '/help' for commands, or 'quit' to exit.".bright_black()
    );
    println!();

    loop {
        let snapshot = usecase.snapshot().await;
        let prompt = prompt(&snapshot.state);
        let readline = if snapshot.state.is_failed() && !snapshot.input.is_empty() {
            rl.readline_with_initial(prompt, (snapshot.input.as_str(), ""))
        } else {
            rl.readline(prompt)
        };

        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                let command = parse_command(&line);
                if command == Command::Quit {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
                handle(&usecase, command).await;
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    placeholder_task.abort();
    poller_task.abort();
    usecase.stop_all().await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_calibrates() {
        assert_eq!(parse_command("  我很焦虑  "), Command::Calibrate("我很焦虑"));
        assert_eq!(parse_command("quit"), Command::Quit);
        assert_eq!(parse_command("exit"), Command::Quit);
    }

    #[test]
    fn test_commands_with_positions() {
        assert_eq!(parse_command("/play"), Command::Play(None));
        assert_eq!(parse_command("/play 3"), Command::Play(Some(2)));
        assert_eq!(parse_command("/history 1"), Command::History(Some(0)));
        assert!(matches!(parse_command("/play 0"), Command::Invalid(_)));
        assert!(matches!(parse_command("/play x"), Command::Invalid(_)));
    }

    #[test]
    fn test_unknown_command() {
        assert!(matches!(parse_command("/dance"), Command::Invalid(message) if message.contains("/dance")));
        assert_eq!(parse_command("/ambient"), Command::Ambient);
    }

    #[test]
    fn test_prompt_follows_state() {
        assert_eq!(prompt(&SessionState::Idle), ">> ");
        assert_eq!(
            prompt(&SessionState::Loading {
                input_text: "x".to_string()
            }),
            "⧗ "
        );
    }
}
