//! Terminal runner (default binary).
//!
//! Drives the simulation with crossterm input at a fixed tick and prints a
//! text view: a status line, a top-down height map of the stage and the layer
//! fill counts. Logs go to stderr, filtered by `RUST_LOG` (default `warn`).

use std::collections::HashMap;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::{cursor, queue, terminal};
use tracing::info;

use cube_tetris::core::{GameSnapshot, GameState, PauseRequest, PauseToggle, Playfield, SimConfig};
use cube_tetris::input::{should_quit, InputHandler};
use cube_tetris::types::{
    GameAction, CELL_SCALE, FALL_SPAN_MS, PLAYFIELD_DEPTH, PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH,
    TICK_MS,
};

#[derive(Parser, Debug)]
#[command(name = "cube-tetris")]
#[command(about = "3D falling-block puzzle in the terminal")]
struct Args {
    /// Seed of the piece generator
    #[arg(long, default_value_t = 1)]
    seed: u32,

    /// Stage width in cells (X)
    #[arg(long, default_value_t = PLAYFIELD_WIDTH)]
    width: i32,

    /// Stage depth in cells (Z)
    #[arg(long, default_value_t = PLAYFIELD_DEPTH)]
    depth: i32,

    /// Stage height in cells (Y)
    #[arg(long, default_value_t = PLAYFIELD_HEIGHT)]
    height: i32,

    /// Milliseconds between gravity steps
    #[arg(long, default_value_t = FALL_SPAN_MS)]
    fall_ms: u32,
}

impl Args {
    fn to_config(&self) -> Result<SimConfig> {
        let playfield = Playfield::new(self.width, self.depth, self.height, CELL_SCALE);
        let config = SimConfig {
            seed: self.seed,
            fall_span_ms: self.fall_ms,
            ..SimConfig::with_playfield(playfield)
        };
        config.validate().with_context(|| {
            format!(
                "unusable stage --width {} --depth {} --height {}",
                self.width, self.depth, self.height
            )
        })?;
        Ok(config)
    }
}

enum Screen {
    Title,
    Playing,
    GameOver { result: String },
}

/// Raw mode plus alternate screen, restored on drop
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        queue!(out, terminal::EnterAlternateScreen, cursor::Hide)?;
        out.flush()?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = io::stdout();
        let _ = queue!(out, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = out.flush();
        let _ = terminal::disable_raw_mode();
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let args = Args::parse();
    let config = args.to_config()?;
    info!(?config, "starting");

    let _guard = TerminalGuard::enter()?;
    run(config)
}

fn run(config: SimConfig) -> Result<()> {
    let mut game = GameState::with_config(config);
    let mut input = InputHandler::new();
    let mut pause = PauseToggle::new();
    let mut screen = Screen::Title;

    let tick_duration = Duration::from_millis(TICK_MS as u64);
    let mut last_tick = Instant::now();

    loop {
        draw(&screen, &game.snapshot())?;

        // Input with timeout until next tick.
        let timeout = tick_duration.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if should_quit(key) {
                    return Ok(());
                }
                let action = input.handle_key_event(key);
                match action {
                    Some(GameAction::Confirm) if !matches!(screen, Screen::Playing) => {
                        game.reset();
                        game.start()?;
                        screen = Screen::Playing;
                    }
                    Some(action) if matches!(screen, Screen::Playing) => {
                        if pause.handle(action) == PauseRequest::ReturnToStart {
                            game.reset();
                            input.reset();
                            screen = Screen::Title;
                        }
                    }
                    _ => {}
                }
            }
        }

        if last_tick.elapsed() < tick_duration {
            continue;
        }
        last_tick = Instant::now();

        let frame = input.take_frame();
        if !matches!(screen, Screen::Playing) {
            continue;
        }
        match game.tick(TICK_MS, &frame, &pause) {
            Ok(_) => {}
            Err(err) if err.is_game_over() => {
                screen = Screen::GameOver {
                    result: game.timer().result_string(),
                };
            }
            Err(err) => return Err(err.into()),
        }
    }
}

fn draw(screen: &Screen, snapshot: &GameSnapshot) -> Result<()> {
    let mut lines: Vec<String> = Vec::new();
    match screen {
        Screen::Title => {
            lines.push("CUBE TETRIS".to_string());
            lines.push(String::new());
            lines.push("Enter: start   q: quit".to_string());
            lines.push("arrows: move   shift+arrows: camera".to_string());
            lines.push("w/d/a: rotate about X/Y/Z   esc: pause".to_string());
        }
        Screen::Playing => {
            lines.push(snapshot.status_line());
            lines.push(String::new());
            lines.extend(height_map(snapshot));
            lines.push(String::new());
            lines.push(format!("layers {}", snapshot.layer_summary()));
            if snapshot.paused {
                lines.push("paused - esc: resume   backspace: title".to_string());
            }
        }
        Screen::GameOver { result } => {
            lines.push("GAME OVER".to_string());
            lines.push(format!("time {}", result));
            lines.push(format!(
                "pieces {}   layers cleared {}",
                snapshot.pieces_locked, snapshot.layers_cleared
            ));
            lines.push(String::new());
            lines.push("Enter: play again   q: quit".to_string());
        }
    }

    let mut out = io::stdout();
    queue!(out, cursor::MoveTo(0, 0), terminal::Clear(terminal::ClearType::All))?;
    for (row, line) in lines.iter().enumerate() {
        queue!(out, cursor::MoveTo(0, row as u16))?;
        out.write_all(line.as_bytes())?;
    }
    out.flush()?;
    Ok(())
}

/// Top-down view, back row first: `@` active piece, digit column height, `.` empty
fn height_map(snapshot: &GameSnapshot) -> Vec<String> {
    let mut tops: HashMap<(i32, i32), i32> = HashMap::new();
    for settled in &snapshot.settled {
        let top = tops.entry((settled.cell.x, settled.cell.z)).or_insert(0);
        *top = (*top).max(settled.cell.y + 1);
    }
    let active: Vec<(i32, i32)> = snapshot
        .active
        .as_ref()
        .map(|a| a.cells.iter().map(|c| (c.x, c.z)).collect())
        .unwrap_or_default();

    (0..snapshot.depth)
        .rev()
        .map(|z| {
            (0..snapshot.width)
                .map(|x| {
                    if active.contains(&(x, z)) {
                        '@'
                    } else {
                        match tops.get(&(x, z)) {
                            None => '.',
                            Some(&h) if h < 10 => char::from(b'0' + h as u8),
                            Some(_) => '+',
                        }
                    }
                })
                .flat_map(|c| [c, ' '])
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect()
}
