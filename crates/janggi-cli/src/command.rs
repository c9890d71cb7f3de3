//! Text commands accepted on stdin.

use janggi_core::{Cell, ParseError, PieceKind};
use std::str::FromStr;
use thiserror::Error;

pub const HELP: &str = "\
commands:
  move <x>,<y> <x>,<y>   move the piece on the first cell to the second
  drop <kind> <x>,<y>    drop a piece of that kind from your pool
  moves                  list legal steps
  board                  show the board
  json                   print the game state as JSON
  reset                  start over
  help                   show this text
  quit                   leave";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command {0:?}, try \"help\"")]
    UnknownCommand(String),

    #[error("{command} expects {expected}")]
    WrongArguments {
        command: &'static str,
        expected: &'static str,
    },

    #[error("Bad cell {0:?}, expected x,y")]
    BadCell(String),

    #[error(transparent)]
    BadKind(ParseError),
}

/// One line of user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move { from: Cell, to: Cell },
    Drop { kind: PieceKind, to: Cell },
    Moves,
    Board,
    Json,
    Reset,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&name, args)) = words.split_first() else {
            return Err(CommandError::Empty);
        };

        match (name.to_ascii_lowercase().as_str(), args) {
            ("move" | "m", [from, to]) => Ok(Command::Move {
                from: parse_cell(from)?,
                to: parse_cell(to)?,
            }),
            ("move" | "m", _) => Err(CommandError::WrongArguments {
                command: "move",
                expected: "two cells",
            }),
            ("drop" | "d", [kind, to]) => Ok(Command::Drop {
                kind: kind.parse().map_err(CommandError::BadKind)?,
                to: parse_cell(to)?,
            }),
            ("drop" | "d", _) => Err(CommandError::WrongArguments {
                command: "drop",
                expected: "a piece kind and a cell",
            }),
            ("moves", []) => Ok(Command::Moves),
            ("board" | "b", []) => Ok(Command::Board),
            ("json", []) => Ok(Command::Json),
            ("reset", []) => Ok(Command::Reset),
            ("help" | "?", _) => Ok(Command::Help),
            ("quit" | "exit" | "q", _) => Ok(Command::Quit),
            (other, _) => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }
}

/// Parse `x,y`
pub fn parse_cell(text: &str) -> Result<Cell, CommandError> {
    let bad = || CommandError::BadCell(text.to_string());
    let (x, y) = text.split_once(',').ok_or_else(bad)?;
    let x = x.trim().parse().map_err(|_| bad())?;
    let y = y.trim().parse().map_err(|_| bad())?;
    Ok(Cell::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move() {
        assert_eq!(
            "move 3,0 2,0".parse(),
            Ok(Command::Move {
                from: Cell::new(3, 0),
                to: Cell::new(2, 0)
            })
        );
        assert_eq!(
            "M 2,1 1,1".parse::<Command>(),
            Ok(Command::Move {
                from: Cell::new(2, 1),
                to: Cell::new(1, 1)
            })
        );
    }

    #[test]
    fn test_parse_drop() {
        assert_eq!(
            "drop man 2,0".parse(),
            Ok(Command::Drop {
                kind: PieceKind::Man,
                to: Cell::new(2, 0)
            })
        );
        assert_eq!(
            "drop queen 2,0".parse::<Command>(),
            Err(CommandError::BadKind(ParseError::UnknownKind("queen".to_string())))
        );
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!("board".parse(), Ok(Command::Board));
        assert_eq!("  moves ".parse(), Ok(Command::Moves));
        assert_eq!("QUIT".parse(), Ok(Command::Quit));
        assert_eq!("json".parse(), Ok(Command::Json));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert!(matches!(
            "fly 1,1".parse::<Command>(),
            Err(CommandError::UnknownCommand(_))
        ));
        assert!(matches!(
            "move 1,1".parse::<Command>(),
            Err(CommandError::WrongArguments { command: "move", .. })
        ));
        assert_eq!(
            "move 1;1 2,2".parse::<Command>(),
            Err(CommandError::BadCell("1;1".to_string()))
        );
    }

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse_cell("0,2"), Ok(Cell::new(0, 2)));
        assert_eq!(parse_cell(" 1, 1"), Ok(Cell::new(1, 1)));
        assert!(parse_cell("a,1").is_err());
        assert!(parse_cell("12").is_err());
    }
}
