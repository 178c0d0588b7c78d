use gogame_vote::core::errors::AppError;
use gogame_vote::core::{config, logger};
use gogame_vote::gogame::parser::parse_command;
use gogame_vote::gogame::registry::Registry;
use gogame_vote::gogame::store::MemoryStore;

use clap::{App, Arg};
use log::{info, warn};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let matches = App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("Sets a custom config file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("debug-file")
                .short("d")
                .long("debug-file")
                .value_name("Debug file")
                .help("Output debug to a file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .help("Sets the level of verbosity"),
        )
        .get_matches();

    logger::init_logger(
        matches.value_of("debug-file"),
        logger::get_logger_level_by_verbosity(matches.occurrences_of("v")),
    )?;

    let app_config = config::get_app_config(matches.value_of("config"))?;

    let (events, mut results) = mpsc::unbounded_channel();
    let registry = Registry::new(
        &app_config,
        Arc::new(MemoryStore::new()),
        events,
        Handle::current(),
    );

    let printer = tokio::spawn(async move {
        while let Some(message) = results.recv().await {
            print!("{}", message);
        }
    });

    info!("reading commands as '<player> <command>' lines from stdin");

    // each line is "<player> <command...>", e.g. "alice move D4"
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.map_err(|e| AppError {
        message: format!("Error reading stdin: {}", e),
    })? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (player, text) = match line.split_once(char::is_whitespace) {
            Some(parts) => parts,
            None => {
                println!("usage: <player> <command>");
                continue;
            }
        };

        let reply = parse_command(text, &app_config.voting)
            .and_then(|command| registry.handle(player, command));
        match reply {
            Ok(message) => print!("{}", message),
            Err(e) => {
                warn!("{} failed '{}': {}", player, text, e);
                println!("{}", e);
            }
        }
    }

    registry.shutdown().await;
    drop(registry);

    printer.await.map_err(|e| AppError {
        message: format!("Error flushing results: {}", e),
    })?;

    Ok(())
}
