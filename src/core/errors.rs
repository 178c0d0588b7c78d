use std::fmt;

#[derive(thiserror::Error)]
#[error("{message}")]
pub struct AppError {
    pub message: String,
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.message)
    }
}

impl From<GameError> for AppError {
    fn from(err: GameError) -> Self {
        AppError {
            message: err.to_string(),
        }
    }
}

/// Every recoverable failure a command can run into.
///
/// None of these end the process or a scheduler task; they are reported back
/// to whoever issued the command.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("must play in an empty space")]
    OccupiedCell,
    #[error("not enough liberties")]
    Suicide,
    #[error("move repeats the previous board (ko)")]
    KoViolation,
    #[error("not your turn")]
    Unauthorized,
    #[error("game not found")]
    GameNotFound,
    #[error("not your game")]
    NotYourGame,
    #[error("please vote for a move")]
    VotingRequired,
    #[error("voting not allowed")]
    VotingNotAllowed,
    #[error("no votes cast")]
    NoVotesCast,
    #[error("game is over")]
    GameOver,
    #[error("invalid coordinates: {0}")]
    InvalidCoords(String),
    #[error("could not understand {0}")]
    UnknownCommand(String),
    #[error("storage error: {0}")]
    Storage(String),
}
