//! Computer players.
//!
//! - Easy: a uniformly random legal step
//! - Medium: wins when it can, otherwise captures, otherwise plays at random

use crate::actions::Step;
use crate::game::JanggiGame;
use crate::piece::{ParseError, PieceKind, Player};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bot difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BotDifficulty {
    Easy,
    #[default]
    Medium,
}

impl fmt::Display for BotDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotDifficulty::Easy => f.write_str("easy"),
            BotDifficulty::Medium => f.write_str("medium"),
        }
    }
}

impl FromStr for BotDifficulty {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(BotDifficulty::Easy),
            "medium" => Ok(BotDifficulty::Medium),
            _ => Err(ParseError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// A bot seat that picks steps for one player
pub struct Bot {
    pub player: Player,
    pub difficulty: BotDifficulty,
    rng: StdRng,
}

impl Bot {
    pub fn new(player: Player, difficulty: BotDifficulty) -> Self {
        Self {
            player,
            difficulty,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(player: Player, difficulty: BotDifficulty, seed: u64) -> Self {
        Self {
            player,
            difficulty,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Pick a step, or `None` if it is not our turn or nothing is legal
    pub fn choose_step(&mut self, game: &JanggiGame) -> Option<Step> {
        if game.is_finished() || game.current_player() != self.player {
            return None;
        }
        let steps = game.legal_steps();
        if steps.is_empty() {
            return None;
        }

        match self.difficulty {
            BotDifficulty::Easy => self.choose_easy(&steps),
            BotDifficulty::Medium => self.choose_medium(game, &steps),
        }
    }

    fn choose_easy(&mut self, steps: &[Step]) -> Option<Step> {
        steps.choose(&mut self.rng).copied()
    }

    fn choose_medium(&mut self, game: &JanggiGame, steps: &[Step]) -> Option<Step> {
        if let Some(step) = steps.iter().find(|s| is_winning(game, s)) {
            return Some(*step);
        }

        let captures: Vec<Step> = steps
            .iter()
            .filter(|s| game.marker_at(s.destination).is_some())
            .copied()
            .collect();
        if let Some(step) = captures.choose(&mut self.rng) {
            return Some(*step);
        }

        self.choose_easy(steps)
    }
}

/// Takes the enemy King, or walks our King into enemy territory
fn is_winning(game: &JanggiGame, step: &Step) -> bool {
    let takes_king = game
        .marker_at(step.destination)
        .is_some_and(|m| m.kind == PieceKind::King);
    let king_arrives = step.marker.kind == PieceKind::King
        && game.node_of(step.marker).is_some_and(|n| !n.is_pool())
        && game.in_opponent_territory(step.marker.owner, step.destination);
    takes_king || king_arrives
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;
    use crate::piece::{Marker, Node};

    #[test]
    fn test_bot_creation() {
        let bot = Bot::new(Player::Red, BotDifficulty::Easy);
        assert_eq!(bot.player, Player::Red);
        assert_eq!(bot.difficulty, BotDifficulty::Easy);
    }

    #[test]
    fn test_easy_bot_chooses_legal_step() {
        let game = JanggiGame::new();
        let mut bot = Bot::with_seed(Player::Green, BotDifficulty::Easy, 7);
        let step = bot.choose_step(&game).unwrap();
        assert!(game.legal_steps().contains(&step));
    }

    #[test]
    fn test_bot_waits_for_its_turn() {
        let game = JanggiGame::new();
        let mut bot = Bot::new(Player::Red, BotDifficulty::Medium);
        assert_eq!(bot.choose_step(&game), None);
    }

    #[test]
    fn test_medium_bot_captures() {
        let game = JanggiGame::new();
        let mut bot = Bot::with_seed(Player::Green, BotDifficulty::Medium, 1);
        let step = bot.choose_step(&game).unwrap();
        assert_eq!(
            step,
            Step::new(Marker::first(Player::Green, PieceKind::Man), Cell::new(1, 1))
        );
    }

    #[test]
    fn test_medium_bot_takes_the_king() {
        let game = JanggiGame::with_position(
            &[
                (Marker::first(Player::Green, PieceKind::King), Node::at(3, 1)),
                (Marker::first(Player::Green, PieceKind::General), Node::at(1, 1)),
                (Marker::first(Player::Red, PieceKind::King), Node::at(0, 1)),
                (Marker::first(Player::Red, PieceKind::Man), Node::at(1, 2)),
            ],
            0,
        )
        .unwrap();
        let mut bot = Bot::with_seed(Player::Green, BotDifficulty::Medium, 3);
        let step = bot.choose_step(&game).unwrap();
        assert_eq!(step.destination, Cell::new(0, 1));
    }

    #[test]
    fn test_difficulty_parsing() {
        assert_eq!("Easy".parse::<BotDifficulty>(), Ok(BotDifficulty::Easy));
        assert_eq!("medium".parse::<BotDifficulty>(), Ok(BotDifficulty::Medium));
        assert_eq!(
            "hard".parse::<BotDifficulty>(),
            Err(ParseError::UnknownDifficulty("hard".to_string()))
        );
    }
}
