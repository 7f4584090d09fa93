//! REVTRIS headless driver
//!
//! Feeds a list of pieces to the AI at a fixed pace and prints where the
//! round ended up.

use anyhow::{Context, bail};
use clap::Parser;
use revtris::audio::{Sfx, SoundSink};
use revtris::{Controller, Difficulty, GameMode, PieceType, Rejection, Settings};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Send pieces to the AI and watch it cope.
#[derive(Parser, Debug)]
#[command(name = "revtris", version)]
struct Opts {
    /// AI difficulty (easy, normal, hard)
    #[arg(long)]
    difficulty: Option<Difficulty>,
    /// Scoring mode (classic, countdown)
    #[arg(long)]
    mode: Option<GameMode>,
    /// Pieces to send, in order, e.g. IOTSZJL
    #[arg(long, default_value = "IOTSZJLIOT")]
    pieces: String,
    /// Delay between submissions in milliseconds
    #[arg(long, default_value_t = 200)]
    interval_ms: u64,
    /// Seed for the AI's randomness
    #[arg(long)]
    seed: Option<u64>,
    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,
    /// Settings file (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the effective settings back to the settings file
    #[arg(long)]
    save_config: bool,
}

/// Sound cues go to the log; playback belongs to a real front end
struct LogSink;

impl SoundSink for LogSink {
    fn play(&self, sfx: Sfx) {
        tracing::debug!("Play {}", sfx.filename());
    }
}

fn revtris_temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("revtris");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn parse_pieces(text: &str) -> anyhow::Result<Vec<PieceType>> {
    text.chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(|c| PieceType::try_from(c).map_err(anyhow::Error::from))
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();

    let session_id: u32 = rand::random();
    let log_dir = revtris_temp_dir();
    let log_file = format!("{:08x}.log", session_id);

    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("revtris=debug".parse()?),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        "REVTRIS starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    let mut settings = match &opts.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .map_err(anyhow::Error::msg)
    .context("loading settings")?;

    if let Some(difficulty) = opts.difficulty {
        settings.gameplay.difficulty = difficulty;
    }
    if let Some(mode) = opts.mode {
        settings.gameplay.mode = mode;
    }
    if opts.seed.is_some() {
        settings.ai.seed = opts.seed;
    }

    if opts.save_config {
        match &opts.config {
            Some(path) => settings.save_to(path),
            None => settings.save(),
        }
        .map_err(anyhow::Error::msg)
        .context("saving settings")?;
    }

    let pieces = parse_pieces(&opts.pieces)?;
    if pieces.is_empty() {
        bail!("no pieces to send");
    }

    let (controller, worker) = Controller::spawn(&settings, Arc::new(LogSink));
    controller.start();

    let interval = Duration::from_millis(opts.interval_ms);
    for kind in pieces {
        match controller.submit_piece(kind) {
            Ok(()) => {}
            Err(Rejection::GameOver) => break,
            Err(rejection) => eprintln!("{} not sent: {}", kind, rejection),
        }
        tokio::time::sleep(interval).await;
    }

    let snapshot = controller.settled().await;
    controller.shutdown();
    worker.await.context("controller worker panicked")?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", snapshot.render_text());
        let counts: Vec<String> = PieceType::all()
            .iter()
            .map(|kind| format!("{}:{}", kind, snapshot.stats.piece_counts.get(*kind)))
            .collect();
        println!("{}", counts.join(" "));
    }

    tracing::info!("Final score {}", snapshot.stats.score);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pieces() {
        let pieces = parse_pieces("i o, T").unwrap();
        assert_eq!(pieces, vec![PieceType::I, PieceType::O, PieceType::T]);
        assert!(parse_pieces("IX").is_err());
    }

    #[test]
    fn test_cli_args() {
        let opts = Opts::try_parse_from(["revtris", "--difficulty", "hard", "--mode", "countdown", "--json"])
            .unwrap();
        assert_eq!(opts.difficulty, Some(Difficulty::Hard));
        assert_eq!(opts.mode, Some(GameMode::Countdown));
        assert!(opts.json);
        assert!(Opts::try_parse_from(["revtris", "--difficulty", "brutal"]).is_err());
    }
}
