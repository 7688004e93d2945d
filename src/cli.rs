/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::str::FromStr;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use crate::{Action, BoardConfig, SearchConfig, DEFAULT_SIZE, DEFAULT_WALLS};

/// A command to be sent to the engine.
#[derive(Debug, Clone, Parser)]
#[command(
    multicall = true,
    about,
    rename_all = "lower",
    override_usage("<ENGINE COMMAND>")
)]
pub enum EngineCommand {
    /// Print a visual representation of the current board state.
    #[command(alias = "d")]
    Display,

    /// Print the distance of every cell to a player's goal.
    #[command(alias = "dist")]
    Distances {
        /// Only print the field of this player.
        player: Option<usize>,
    },

    /// Print an evaluation of the current position.
    Eval,

    /// Quit the engine.
    #[command(alias = "quit")]
    Exit,

    /// Let the computer play for the current player.
    Go,

    /// Display or change how many plies the computer looks ahead.
    Level { level: Option<usize> },

    /// Shows all pawn moves available to the current player.
    Moves,

    /// Start a new match with the same settings.
    New,

    /// Apply the provided action for the current player, if it is legal.
    ///
    /// Actions are either pawn moves (`e9-e8`) or walls (`e5h`, `d3v`).
    /// Any computer players reply right away.
    Play { action: Action },

    /// Print the key of the current state.
    State,

    /// Display memo sizes and hit counters of the computer's search.
    Stats,

    /// Shows all walls the current player may place.
    Walls,
}

impl FromStr for EngineCommand {
    type Err = clap::Error;

    /// Attempt to parse an [`EngineCommand`] from a string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse_from(s.split_ascii_whitespace())
    }
}

/// Verbosity of the logs written to `stderr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Off => Self::Off,
            LogLevel::Error => Self::Error,
            LogLevel::Warn => Self::Warn,
            LogLevel::Info => Self::Info,
            LogLevel::Debug => Self::Debug,
            LogLevel::Trace => Self::Trace,
        }
    }
}

/// Command-line arguments of the engine.
#[derive(Debug, Clone, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// How many plies the computer looks ahead.
    #[arg(short, long, default_value_t = 0)]
    pub level: usize,

    /// Number of rows on the board.
    #[arg(long, default_value_t = DEFAULT_SIZE)]
    pub rows: usize,

    /// Number of columns on the board.
    #[arg(long, default_value_t = DEFAULT_SIZE)]
    pub cols: usize,

    /// Walls per player in a two-player match; four players get half as many each.
    #[arg(short, long, default_value_t = DEFAULT_WALLS)]
    pub walls: u8,

    /// Number of players, either 2 or 4.
    #[arg(short, long, default_value_t = 2)]
    pub players: usize,

    /// Players moved by the computer. Pass the flag without values for a match between humans.
    #[arg(short, long, num_args = 0.., default_values_t = [1])]
    pub computer: Vec<usize>,

    /// Disable alpha-beta pruning.
    #[arg(long, default_value = "false")]
    pub no_pruning: bool,

    /// Disable memoization of search results.
    #[arg(long, default_value = "false")]
    pub no_memo: bool,

    /// Verbosity of the logs written to `stderr`.
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,
}

impl Cli {
    /// The board these arguments describe.
    pub fn board_config(&self) -> BoardConfig {
        BoardConfig {
            rows: self.rows,
            cols: self.cols,
            walls: self.walls,
            players: self.players,
        }
    }

    /// The search these arguments describe.
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            level: self.level,
            pruning: !self.no_pruning,
            memoize: !self.no_memo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Wall;

    #[test]
    fn test_parse_engine_commands() {
        assert!(matches!("d".parse::<EngineCommand>(), Ok(EngineCommand::Display)));
        assert!(matches!("quit".parse::<EngineCommand>(), Ok(EngineCommand::Exit)));
        assert!(matches!(
            "level 2".parse::<EngineCommand>(),
            Ok(EngineCommand::Level { level: Some(2) })
        ));
        assert!(matches!(
            "level".parse::<EngineCommand>(),
            Ok(EngineCommand::Level { level: None })
        ));

        let Ok(EngineCommand::Play { action }) = "play e5h".parse::<EngineCommand>() else {
            panic!("Failed to parse a wall placement");
        };
        assert_eq!(action, Action::PlaceWall(Wall::horizontal(4, 4)));

        assert!("play e5x".parse::<EngineCommand>().is_err());
        assert!("fly".parse::<EngineCommand>().is_err());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["hedge"]);
        assert_eq!(cli.board_config(), BoardConfig::default());
        assert_eq!(cli.search_config(), SearchConfig::default());
        assert_eq!(cli.computer, vec![1]);
        assert_eq!(cli.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from([
            "hedge", "--level", "2", "--players", "4", "--computer", "1", "3", "--no-memo",
        ]);

        assert_eq!(cli.search_config().level, 2);
        assert!(!cli.search_config().memoize);
        assert!(cli.search_config().pruning);
        assert_eq!(cli.board_config().players, 4);
        assert_eq!(cli.computer, vec![1, 3]);
    }
}
