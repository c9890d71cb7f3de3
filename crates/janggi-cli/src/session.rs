//! A game in progress with an optional bot seat.

use janggi_core::{Bot, Cell, GameError, JanggiGame, Marker, Node, PieceKind, Step, StepEvent};
use thiserror::Error;
use tracing::{debug, info};

use crate::command::{Command, HELP};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No piece on {0}")]
    NoPiece(Cell),

    #[error("No {0} in your pool")]
    NotInPool(PieceKind),

    #[error("That step is not legal")]
    IllegalStep,

    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// What a command asks the loop to do next
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Print these lines and keep going
    Continue(Vec<String>),
    Quit,
}

pub struct Session {
    pub game: JanggiGame,
    bot: Option<Bot>,
}

impl Session {
    pub fn new(bot: Option<Bot>) -> Self {
        if let Some(bot) = &bot {
            info!(player = %bot.player, difficulty = %bot.difficulty, "bot seated");
        }
        Self {
            game: JanggiGame::new(),
            bot,
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<Outcome, SessionError> {
        let lines = match command {
            Command::Move { from, to } => {
                let marker = self.game.marker_at(from).ok_or(SessionError::NoPiece(from))?;
                self.play(marker_step(&self.game, marker, to)?)?
            }
            Command::Drop { kind, to } => {
                let player = self.game.current_player();
                let marker = self
                    .game
                    .pool(player)
                    .into_iter()
                    .find(|m| m.kind == kind)
                    .ok_or(SessionError::NotInPool(kind))?;
                self.play(marker_step(&self.game, marker, to)?)?
            }
            Command::Moves => self
                .game
                .legal_steps()
                .iter()
                .map(|step| self.describe_step(step))
                .collect(),
            Command::Board => self.board(),
            Command::Json => vec![self.game.to_json()?],
            Command::Reset => {
                self.game.reset()?;
                info!("game reset");
                self.board()
            }
            Command::Help => HELP.lines().map(str::to_string).collect(),
            Command::Quit => return Ok(Outcome::Quit),
        };
        Ok(Outcome::Continue(lines))
    }

    /// Let the bot move if it is its turn. Returns `None` when it has nothing to do.
    pub fn bot_turn(&mut self) -> Result<Option<Vec<String>>, SessionError> {
        let Some(bot) = self.bot.as_mut() else {
            return Ok(None);
        };
        let Some(step) = bot.choose_step(&self.game) else {
            return Ok(None);
        };
        debug!(marker = %step.marker, destination = %step.destination, "bot step");
        self.play(step).map(Some)
    }

    /// The board followed by whose turn it is
    pub fn board(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.game.to_string().lines().map(str::to_string).collect();
        lines.push(match self.game.winner() {
            Some(player) => format!("{player} has won, \"reset\" to play again"),
            None => format!("{} to move", self.game.current_player()),
        });
        lines
    }

    fn play(&mut self, step: Step) -> Result<Vec<String>, SessionError> {
        let events = self.game.apply_step(step)?;
        let mut lines: Vec<String> = events.iter().map(describe_event).collect();
        lines.extend(self.board());
        Ok(lines)
    }

    fn describe_step(&self, step: &Step) -> String {
        match self.game.node_of(step.marker) {
            Some(Node::Cell(from)) => format!("move {from} {}", step.destination),
            Some(Node::Pool(_)) => {
                format!("drop {} {}", step.marker.kind.abbrev().to_lowercase(), step.destination)
            }
            None => format!("{} -> {}", step.marker, step.destination),
        }
    }
}

fn marker_step(
    game: &JanggiGame,
    marker: Marker,
    to: Cell,
) -> Result<Step, SessionError> {
    game.is_step_valid(marker, to)?
        .ok_or(SessionError::IllegalStep)
}

fn describe_event(event: &StepEvent) -> String {
    match event {
        StepEvent::Dropped { marker, to } => format!("{marker} dropped on {to}"),
        StepEvent::Moved { marker, from, to } => format!("{marker} {from} -> {to}"),
        StepEvent::Captured {
            captured,
            now,
            pool,
        } => format!("{captured} captured, now {now} in the {pool}"),
        StepEvent::Promoted { from, to, at } => format!("{from} promoted to {to} on {at}"),
        StepEvent::Won { player } => format!("{player} wins!"),
    }
}
