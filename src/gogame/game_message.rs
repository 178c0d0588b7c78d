use crate::core::entities::GameId;
use crate::gogame::game::GameState;
use std::fmt;

/// What the core hands back to the transport: either plain text or a full
/// snapshot of a game together with what just happened in it.
#[derive(Clone, Debug, PartialEq)]
pub enum GameMessage {
    Text(String),
    GameUpdated {
        id: GameId,
        state: Box<GameState>,
        details: String,
    },
}

impl GameMessage {
    pub fn text<S: Into<String>>(text: S) -> Self {
        GameMessage::Text(text.into())
    }

    pub fn updated(id: GameId, state: &GameState, details: &str) -> Self {
        GameMessage::GameUpdated {
            id,
            state: Box::new(state.clone()),
            details: details.to_string(),
        }
    }

    pub fn details(&self) -> &str {
        match self {
            GameMessage::Text(text) => text,
            GameMessage::GameUpdated { details, .. } => details,
        }
    }
}

impl fmt::Display for GameMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMessage::Text(text) => writeln!(f, "{}", text),
            GameMessage::GameUpdated { id, state, details } => {
                if details.is_empty() {
                    writeln!(f, "game {}", id)?;
                } else {
                    writeln!(f, "game {}: {}", id, details)?;
                }
                write!(f, "{}", state.current_board())?;
                if state.finished() {
                    write!(f, "game over")?;
                } else {
                    write!(f, "{} to move", state.next.name())?;
                }
                writeln!(
                    f,
                    ", captures black {} white {}",
                    state.captures.black, state.captures.white
                )
            }
        }
    }
}
