/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use clap::Parser;
use hedge::{Cli, Engine};

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.into())
        .parse_default_env()
        .init();

    let mut engine = match Engine::new(cli.board_config(), cli.search_config(), cli.computer) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("{} failed to start: {e:#}", env!("CARGO_PKG_NAME"));
            std::process::exit(1);
        }
    };

    if let Err(e) = engine.run() {
        eprintln!("{} encountered an error: {e:#}", env!("CARGO_PKG_NAME"));
    }
}
