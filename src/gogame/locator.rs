use crate::core::entities::GameId;
use crate::core::errors::GameError;
use crate::gogame::command::GameSelector;

/// A game as seen by the locator.
pub trait Playable {
    fn id(&self) -> GameId;
    /// Whether `player` takes part in the game, whoever's turn it is.
    fn is_player(&self, player: &str) -> bool;
}

/// Resolves a selector against `games`, which must already be in the
/// caller's preferred order (most recently updated first).
pub fn find<'a, P: Playable>(
    selector: GameSelector,
    games: &'a [P],
    player: &str,
) -> Result<&'a P, GameError> {
    match selector {
        GameSelector::Id(id) => find_by_id(games, id, player),
        GameSelector::Auto => find_auto(games, player),
    }
}

pub fn find_by_id<'a, P: Playable>(
    games: &'a [P],
    id: GameId,
    player: &str,
) -> Result<&'a P, GameError> {
    let game = games
        .iter()
        .find(|g| g.id() == id)
        .ok_or(GameError::GameNotFound)?;

    if game.is_player(player) {
        Ok(game)
    } else {
        Err(GameError::NotYourGame)
    }
}

pub fn find_auto<'a, P: Playable>(games: &'a [P], player: &str) -> Result<&'a P, GameError> {
    games
        .iter()
        .find(|g| g.is_player(player))
        .ok_or(GameError::GameNotFound)
}
