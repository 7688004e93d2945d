/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    io::{self, Write},
    sync::mpsc::{channel, Receiver, Sender},
    thread,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};

use crate::{Action, Ai, Board, BoardConfig, EngineCommand, SearchConfig, MAX_LEVEL};

/// The hedge engine: a match, the computer players' search session, and a command loop to drive them.
pub struct Engine {
    /// The current state of the match, as known to the engine.
    ///
    /// This is modified whenever actions are played,
    /// and is reset whenever the engine is told to start a new match.
    board: Board,

    /// Search session shared by every computer player of the match.
    ai: Ai,

    board_config: BoardConfig,

    /// Players whose turns are played by the computer.
    computer: Vec<usize>,

    /// One half of a channel, responsible for sending commands to the engine to execute.
    sender: Sender<EngineCommand>,

    /// One half of a channel, responsible for receiving commands for the engine to execute.
    receiver: Receiver<EngineCommand>,
}

impl Engine {
    /// Constructs a new [`Engine`] instance to be executed with [`Engine::run`].
    pub fn new(
        board_config: BoardConfig,
        search_config: SearchConfig,
        computer: Vec<usize>,
    ) -> Result<Self> {
        board_config
            .validate()
            .context("Cannot start a match with these settings")?;

        if search_config.level > MAX_LEVEL {
            bail!(
                "Level {} exceeds the maximum of {MAX_LEVEL}",
                search_config.level
            );
        }

        if let Some(player) = computer.iter().find(|&&p| p >= board_config.players) {
            bail!(
                "Cannot hand player {player} to the computer in a {}-player match",
                board_config.players
            );
        }

        let (sender, receiver) = channel();
        let board = Board::new(board_config);
        let ai = new_ai(&board, search_config);

        Ok(Self {
            board,
            ai,
            board_config,
            computer,
            sender,
            receiver,
        })
    }

    /// Returns a string of the engine's name and current version.
    pub fn name(&self) -> String {
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    /// Execute the main event loop for the engine.
    ///
    /// This function spawns a thread to handle input from `stdin` and waits on received commands.
    pub fn run(&mut self) -> Result<()> {
        // Spawn a separate thread for handling user input
        let sender = self.sender.clone();
        thread::spawn(|| {
            if let Err(err) = input_handler(sender) {
                eprintln!("Input handler thread stopping after fatal error: {err:#}");
            }
        });

        println!("{}", self.name());
        self.display();
        self.computer_turns();

        // Loop on user input
        while let Ok(cmd) = self.receiver.recv() {
            if matches!(cmd, EngineCommand::Exit) {
                break;
            }

            // Keep running, even on error
            if let Err(e) = self.handle_command(cmd) {
                eprintln!("Error: {e:#}");
            }
        }

        Ok(())
    }

    /// Handle the execution of a single [`EngineCommand`].
    fn handle_command(&mut self, cmd: EngineCommand) -> Result<()> {
        match cmd {
            EngineCommand::Display => self.display(),

            EngineCommand::Distances { player } => {
                self.ai.refresh(&self.board);
                let players = match player {
                    Some(p) if p < self.board.num_players() => p..p + 1,
                    Some(p) => bail!("There is no player {p}"),
                    None => 0..self.board.num_players(),
                };

                for p in players {
                    println!("Player {p}:\n{}\n", self.ai.distances()[p]);
                }
            }

            EngineCommand::Eval => {
                self.ai.refresh(&self.board);
                println!("{}", self.ai.evaluator(&self.board));
            }

            EngineCommand::Exit => {}

            EngineCommand::Go => {
                self.ensure_playing()?;
                self.computer_move();
                self.computer_turns();
            }

            EngineCommand::Level { level } => match level {
                Some(level) if level > MAX_LEVEL => {
                    bail!("Level {level} exceeds the maximum of {MAX_LEVEL}")
                }
                Some(level) => {
                    self.ai.set_level(level);
                    println!("level := {level}");
                }
                None => println!("level := {}", self.ai.config().level),
            },

            EngineCommand::Moves => {
                let moves = self.board.pawn_actions().collect::<Vec<_>>();
                println!("{}", join_or_none(&moves));
            }

            EngineCommand::New => self.new_game(),

            EngineCommand::Play { action } => {
                self.ensure_playing()?;
                if !self.board.is_legal(action) {
                    bail!(
                        "{action} is not legal for player {}",
                        self.board.current_player()
                    );
                }

                self.apply(action);
                self.computer_turns();
            }

            EngineCommand::State => println!("{}", self.board.state_key()),

            EngineCommand::Stats => println!("{}", self.ai.stats()),

            EngineCommand::Walls => {
                let walls = self
                    .board
                    .legal_walls()
                    .into_iter()
                    .map(Action::PlaceWall)
                    .collect::<Vec<_>>();
                println!("{}", join_or_none(&walls));
            }
        };

        Ok(())
    }

    /// Executes the `display` command, printing the current board.
    fn display(&self) {
        println!("{}", self.board);
    }

    /// Fails if the match is already over.
    fn ensure_playing(&self) -> Result<()> {
        if let Some(winner) = self.board.winner() {
            bail!("The match is over: player {winner} won. Use `new` to start another");
        }
        Ok(())
    }

    /// Applies `action` for the current player and passes the turn.
    fn apply(&mut self, action: Action) {
        let player = self.board.current_player();
        self.board.do_action(action);
        let verb = if action.is_pawn_move() { "moves" } else { "places" };
        info!("Player {player} {verb} {action}");
        println!("Player {player} {verb} {action}");

        // The caches can drop whatever the match can no longer come back to
        let key = self.board.state_key().clone();
        self.ai.prune(&key);

        if let Some(winner) = self.board.winner() {
            self.display();
            println!("Player {winner} wins!");
        } else {
            self.board.next_player();
        }
    }

    /// Lets the computer pick and play an action for the current player.
    ///
    /// Returns `false` if the player had nothing to play and passed.
    fn computer_move(&mut self) -> bool {
        let player = self.board.current_player();

        match self.ai.best_action(&mut self.board) {
            Some((action, score)) => {
                println!("bestmove {action} score {score}");
                self.apply(action);
                true
            }

            None => {
                warn!("Player {player} has nothing to play and passes");
                self.board.next_player();
                false
            }
        }
    }

    /// Plays computer turns until it is a human's turn or the match is over.
    fn computer_turns(&mut self) {
        // Every player passing in a row means nobody can ever move again
        let mut passes = 0;

        while !self.board.finished()
            && self.computer.contains(&self.board.current_player())
            && passes < self.board.num_players()
        {
            if self.computer_move() {
                passes = 0;
            } else {
                passes += 1;
            }
        }

        if !self.board.finished() {
            self.display();
        }
    }

    /// Resets the engine's match, along with every cache of the search.
    fn new_game(&mut self) {
        self.board = Board::new(self.board_config);
        self.ai = new_ai(&self.board, self.ai.config());
        self.display();
        self.computer_turns();
    }
}

/// Creates a search session that reports its progress on `stderr`.
fn new_ai(board: &Board, config: SearchConfig) -> Ai {
    let mut ai = Ai::new(board, config);
    ai.on_progress(|fraction| {
        eprint!("\rThinking... {:3.0}%", fraction * 100.0);
        if fraction >= 1.0 {
            eprintln!();
        }
        let _ = io::stderr().flush();
    });
    ai
}

/// Joins `items` by comma-space, or prints "(none)" if there are none.
fn join_or_none(items: &[Action]) -> String {
    if items.is_empty() {
        String::from("(none)")
    } else {
        items
            .iter()
            .map(|item| item.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Loops endlessly to await input via `stdin`, sending all successfully-parsed commands through the supplied `sender`.
fn input_handler(sender: Sender<EngineCommand>) -> Result<()> {
    let mut buffer = String::with_capacity(256);

    loop {
        // Clear the buffer, read input, and trim the trailing newline
        buffer.clear();
        let bytes = io::stdin()
            .read_line(&mut buffer)
            .context("Failed to read line when parsing commands")?;

        // For ctrl + d
        if 0 == bytes {
            // Send the Exit command and exit this function
            sender
                .send(EngineCommand::Exit)
                .context("Failed to send 'exit' command after receiving empty input")?;

            bail!("Engine received input of 0 bytes and is quitting");
        }

        // Trim any leading/trailing whitespace
        let buf = buffer.trim();

        // Ignore empty lines
        if buf.is_empty() {
            continue;
        }

        match EngineCommand::try_parse_from(buf.split_ascii_whitespace()) {
            Ok(cmd) => sender
                .send(cmd)
                .context("Failed to send command to engine")?,

            // If an invalid command was received, just print the error and continue running
            Err(err) => eprintln!("{err}"),
        }
    }
}
