use crate::core::entities::{Coords, GameId, Players};
use crate::gogame::game::Voting;

/// Which game a command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameSelector {
    Id(GameId),
    /// The most recently updated game the issuing player takes part in.
    Auto,
}

/// Every command the core understands, already parsed and typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start { players: Players, voting: Voting },
    Move { game: GameSelector, coords: Coords },
    Pass { game: GameSelector },
    VoteMove { game: GameSelector, coords: Coords },
    VotePass { game: GameSelector },
    ResolveNow { game: GameSelector },
    Show { game: GameSelector },
    List { all: bool },
    SetVoting { game: GameSelector, enabled: bool },
}
