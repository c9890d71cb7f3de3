//! Play Janggi-lite in the terminal.

use std::io::{self, BufRead, Write};

use clap::Parser;
use janggi_core::{Bot, BotDifficulty, Player};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod command;
mod session;

use command::Command;
use session::{Outcome, Session};

#[derive(Parser)]
#[command(about = "Janggi-lite on a 4x3 board")]
struct Args {
    /// Let the computer play this side ("red" or "green")
    #[arg(long)]
    bot: Option<Player>,

    /// Bot strength ("easy" or "medium")
    #[arg(short, long, default_value_t = BotDifficulty::Medium)]
    difficulty: BotDifficulty,

    /// RNG seed for the bot
    #[arg(long)]
    seed: Option<u64>,

    /// A tracing filter such as "debug" or "janggi_core=trace"; defaults to RUST_LOG, then "warn"
    #[arg(short, long)]
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = args
        .log_level
        .clone()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "warn".into());
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let bot = args.bot.map(|player| match args.seed {
        Some(seed) => Bot::with_seed(player, args.difficulty, seed),
        None => Bot::new(player, args.difficulty),
    });
    let mut session = Session::new(bot);
    info!("session started");

    let mut stdout = io::stdout().lock();
    print_lines(&mut stdout, &session.board())?;
    play_bot(&mut session, &mut stdout)?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let result = line
            .parse::<Command>()
            .map_err(anyhow::Error::from)
            .and_then(|command| session.execute(command).map_err(anyhow::Error::from));
        match result {
            Ok(Outcome::Continue(lines)) => print_lines(&mut stdout, &lines)?,
            Ok(Outcome::Quit) => break,
            Err(err) => {
                warn!(%line, "command rejected: {err}");
                writeln!(stdout, "error: {err}")?;
            }
        }
        play_bot(&mut session, &mut stdout)?;
    }

    Ok(())
}

/// Let the bot seat move for as long as it is its turn
fn play_bot(session: &mut Session, out: &mut impl Write) -> anyhow::Result<()> {
    while let Some(lines) = session.bot_turn()? {
        print_lines(out, &lines)?;
    }
    Ok(())
}

fn print_lines(out: &mut impl Write, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    out.flush()
}
