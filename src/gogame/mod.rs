pub mod board;
pub mod command;
pub mod game;
pub mod game_message;
pub mod locator;
pub mod parser;
pub mod registry;
pub mod scheduler;
pub mod store;
pub mod votes;
