use crate::core::entities::{Coords, Move, Players, StoneColor};
use crate::core::errors::GameError;
use crate::gogame::board::Board;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::time::Duration;

/// Stones of the _opponent_ each color has captured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Captures {
    pub black: usize,
    pub white: usize,
}

/// Which colors passed since the last stone was placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passes {
    pub black: bool,
    pub white: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voting {
    pub required: bool,
    pub interval_seconds: u64,
}

impl Voting {
    pub fn disabled() -> Self {
        Voting {
            required: false,
            interval_seconds: 0,
        }
    }

    pub fn every(interval: Duration) -> Self {
        Voting {
            required: true,
            interval_seconds: interval.as_secs().max(1),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

/// Every board of a game, oldest first. The last one is the current board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Board>", try_from = "Vec<Board>")]
pub struct History(Vec<Board>);

impl History {
    pub fn new(start: Board) -> Self {
        History(vec![start])
    }

    pub fn current(&self) -> &Board {
        // never empty: built from a start board and only ever appended to
        &self.0[self.0.len() - 1]
    }

    /// True when `board` recreates the position from before the opponent's
    /// last move.
    pub fn ko(&self, board: &Board) -> bool {
        if self.0.len() < 2 {
            return false;
        }
        board.equals(&self.0[self.0.len() - 2])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn push(&mut self, board: Board) {
        self.0.push(board);
    }
}

impl From<History> for Vec<Board> {
    fn from(history: History) -> Self {
        history.0
    }
}

impl TryFrom<Vec<Board>> for History {
    type Error = String;

    fn try_from(boards: Vec<Board>) -> Result<Self, Self::Error> {
        if boards.is_empty() {
            return Err("game without any board".to_string());
        }
        Ok(History(boards))
    }
}

/// Complete state of a single game; also its persisted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub history: History,
    pub next: StoneColor,
    pub players: Players,
    pub voting: Voting,
    pub captures: Captures,
    pub passes: Passes,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GameState {
    pub fn new(players: Players, voting: Voting, board: Board) -> Self {
        let now = Utc::now();
        GameState {
            history: History::new(board),
            next: StoneColor::Black,
            players,
            voting,
            captures: Captures::default(),
            passes: Passes::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn from_json(blob: &str) -> Result<Self, GameError> {
        serde_json::from_str(blob).map_err(|e| GameError::Storage(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, GameError> {
        serde_json::to_string(self).map_err(|e| GameError::Storage(e.to_string()))
    }

    pub fn current_board(&self) -> &Board {
        self.history.current()
    }

    pub fn finished(&self) -> bool {
        self.passes.black && self.passes.white
    }

    pub fn is_voting(&self) -> bool {
        self.voting.required
    }

    /// Whether `player` may make the next move.
    pub fn is_authorized(&self, player: &str) -> bool {
        self.players.plays(self.next, player)
    }

    /// Whether `player` takes part in the game at all.
    pub fn is_player(&self, player: &str) -> bool {
        self.players.is_player(player)
    }

    /// Plays `coords` for the color to move without committing anything.
    pub fn try_move(&self, coords: Coords) -> Result<(Board, usize), GameError> {
        let (next, captures) = self
            .current_board()
            .play(coords.x, coords.y, self.next.stone())?;
        if self.history.ko(&next) {
            return Err(GameError::KoViolation);
        }
        Ok((next, captures))
    }

    pub fn validate_move(&self, coords: Coords) -> bool {
        self.try_move(coords).is_ok()
    }

    pub fn apply(&mut self, player: &str, mv: Move) -> Result<(), GameError> {
        match mv {
            Move::Place(coords) => self.apply_move(player, coords),
            Move::Pass => self.apply_pass(player),
        }
    }

    /// Places a stone for the color to move. On error nothing is changed.
    pub fn apply_move(&mut self, player: &str, coords: Coords) -> Result<(), GameError> {
        self.check_turn(player)?;
        let (board, captures) = self.try_move(coords)?;

        self.history.push(board);
        self.passes = Passes::default();
        match self.next {
            StoneColor::Black => self.captures.black += captures,
            StoneColor::White => self.captures.white += captures,
        }
        self.next = self.next.inverse();
        self.updated_at = Utc::now();

        Ok(())
    }

    pub fn apply_pass(&mut self, player: &str) -> Result<(), GameError> {
        self.check_turn(player)?;

        match self.next {
            StoneColor::Black => self.passes.black = true,
            StoneColor::White => self.passes.white = true,
        }
        self.next = self.next.inverse();
        self.updated_at = Utc::now();

        Ok(())
    }

    pub fn set_voting(&mut self, voting: Voting) {
        self.voting = voting;
        self.updated_at = Utc::now();
    }

    fn check_turn(&self, player: &str) -> Result<(), GameError> {
        if self.finished() {
            return Err(GameError::GameOver);
        }
        if !self.is_authorized(player) {
            return Err(GameError::Unauthorized);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entities::Stone;
    use crate::core::entities::Stone::{Black as B, Empty as E, White as W};

    fn board(rows: Vec<Vec<Stone>>) -> Board {
        Board::from_rows(rows).unwrap()
    }

    fn state_with(players: Players, boards: Vec<Board>, next: StoneColor) -> GameState {
        let mut boards = boards.into_iter();
        let mut state = GameState::new(players, Voting::disabled(), boards.next().unwrap());
        for b in boards {
            state.history.push(b);
        }
        state.next = next;
        state
    }

    // black has just taken the white stone at B2; retaking at once is ko
    fn ko_history() -> Vec<Board> {
        vec![
            board(vec![
                vec![E, B, W, E],
                vec![B, W, E, W],
                vec![E, B, W, E],
            ]),
            board(vec![
                vec![E, B, W, E],
                vec![B, E, B, W],
                vec![E, B, W, E],
            ]),
        ]
    }

    #[test]
    fn new_game_starts_empty_with_black() {
        let state = GameState::new(Players::anyone(), Voting::disabled(), Board::standard());

        assert_eq!(1, state.history.len());
        assert_eq!(&Board::standard(), state.current_board());
        assert_eq!(StoneColor::Black, state.next);
        assert!(!state.finished());
    }

    #[test]
    fn authorization_follows_the_turn() {
        let cases = vec![
            (Players::anyone(), StoneColor::Black, "dummy", true),
            (Players::anyone(), StoneColor::White, "dummy", true),
            (Players::pair("foo", "bar"), StoneColor::Black, "foo", true),
            (Players::pair("foo", "bar"), StoneColor::White, "foo", false),
            (Players::pair("foo", "bar"), StoneColor::White, "bar", true),
            (Players::pair("foo", "bar"), StoneColor::Black, "bar", false),
            (Players::pair("foo", "bar"), StoneColor::Black, "baz", false),
        ];

        for (players, next, user, expect) in cases {
            let state = state_with(players, vec![Board::new(2, 2)], next);
            assert_eq!(expect, state.is_authorized(user), "{} on {:?}", user, next);
        }
    }

    #[test]
    fn rostered_players_take_part_on_either_turn() {
        let state = state_with(
            Players::pair("foo", "bar"),
            vec![Board::new(2, 2)],
            StoneColor::White,
        );

        assert!(state.is_player("foo"));
        assert!(state.is_player("bar"));
        assert!(!state.is_player("baz"));
    }

    #[test]
    fn move_appends_board_and_switches_turn() {
        let mut state = state_with(Players::anyone(), vec![Board::new(2, 2)], StoneColor::Black);

        state.apply_move("foo", Coords::from(0, 0)).unwrap();

        assert_eq!(2, state.history.len());
        assert_eq!(&board(vec![vec![B, E], vec![E, E]]), state.current_board());
        assert_eq!(StoneColor::White, state.next);
        assert_eq!(Captures::default(), state.captures);
    }

    #[test]
    fn move_credits_captures_and_clears_passes() {
        let mut state = state_with(
            Players::anyone(),
            vec![board(vec![vec![B, E], vec![W, B]])],
            StoneColor::White,
        );
        state.passes.black = true;

        state.apply_move("foo", Coords::from(1, 0)).unwrap();

        assert_eq!(&board(vec![vec![E, W], vec![W, E]]), state.current_board());
        assert_eq!(Captures { black: 0, white: 2 }, state.captures);
        assert_eq!(Passes::default(), state.passes);
        assert_eq!(StoneColor::Black, state.next);
    }

    #[test]
    fn retaking_ko_is_rejected() {
        let state = state_with(Players::anyone(), ko_history(), StoneColor::White);

        assert_eq!(Err(GameError::KoViolation), state.try_move(Coords::from(1, 1)).map(|_| ()));
        assert!(!state.validate_move(Coords::from(1, 1)));
        assert!(state.validate_move(Coords::from(3, 0)));
    }

    #[test]
    fn single_board_history_never_triggers_ko() {
        let history = ko_history();
        let state = state_with(Players::anyone(), vec![history[1].clone()], StoneColor::White);

        assert!(state.validate_move(Coords::from(1, 1)));
    }

    #[test]
    fn failed_moves_leave_state_unchanged() {
        let players = Players::pair("foo", "bar");
        let state = state_with(players, ko_history(), StoneColor::White);

        let cases = vec![
            ("foo", Move::Place(Coords::from(3, 0)), GameError::Unauthorized),
            ("foo", Move::Pass, GameError::Unauthorized),
            ("bar", Move::Place(Coords::from(1, 1)), GameError::KoViolation),
            ("bar", Move::Place(Coords::from(1, 0)), GameError::OccupiedCell),
            ("bar", Move::Place(Coords::from(0, 0)), GameError::Suicide),
        ];

        for (user, mv, expect) in cases {
            let mut attempt = state.clone();
            assert_eq!(Err(expect), attempt.apply(user, mv));
            assert_eq!(state, attempt);
        }
    }

    #[test]
    fn passes_switch_turn_and_finish_game() {
        let mut state = state_with(Players::anyone(), vec![Board::new(3, 3)], StoneColor::Black);

        state.apply_pass("foo").unwrap();
        assert_eq!(Passes { black: true, white: false }, state.passes);
        assert_eq!(StoneColor::White, state.next);
        assert!(!state.finished());

        state.apply_pass("foo").unwrap();
        assert!(state.finished());
        assert_eq!(1, state.history.len());

        assert_eq!(Err(GameError::GameOver), state.apply_move("foo", Coords::from(1, 1)));
        assert_eq!(Err(GameError::GameOver), state.apply_pass("foo"));
    }

    #[test]
    fn move_between_passes_keeps_game_going() {
        let mut state = state_with(Players::anyone(), vec![Board::new(3, 3)], StoneColor::Black);

        state.apply_pass("foo").unwrap();
        state.apply_move("foo", Coords::from(1, 1)).unwrap();
        state.apply_pass("foo").unwrap();

        assert_eq!(Passes { black: true, white: false }, state.passes);
        assert!(!state.finished());
    }

    #[test]
    fn persisted_record_restores_the_game() {
        let mut state = state_with(Players::pair("foo", "bar"), ko_history(), StoneColor::White);
        state.voting = Voting::every(Duration::from_secs(60));
        state.captures.black = 1;

        let blob = state.to_json().unwrap();
        assert!(blob.contains("\"next\":2"));
        assert!(blob.contains("[0,1,2,0]"));

        assert_eq!(state, GameState::from_json(&blob).unwrap());
        assert!(GameState::from_json("{}").is_err());
        let emptied = blob.replacen(&serde_json::to_string(&state.history).unwrap(), "[]", 1);
        assert!(GameState::from_json(&emptied).is_err());
    }
}
