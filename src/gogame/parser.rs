use crate::core::config::VotingConfig;
use crate::core::entities::{Coords, GameId, Players};
use crate::core::errors::GameError;
use crate::gogame::command::{Command, GameSelector};
use crate::gogame::game::Voting;

const PLAY_TOKEN: &str = "play";
const MOVE_TOKEN: &str = "move";
const PASS_TOKEN: &str = "pass";
const VOTE_TOKEN: &str = "vote";
const RESOLVE_TOKEN: &str = "resolve";
const SHOW_TOKEN: &str = "show";
const LIST_TOKEN: &str = "list";
const VOTING_TOKEN: &str = "voting";

/// Parses one command line such as `move 3 D14` or `vote pass`.
///
/// Game ids are optional everywhere; without one the command goes to the
/// player's most recently updated game.
pub fn parse_command(input: &str, voting: &VotingConfig) -> Result<Command, GameError> {
    let args: Vec<&str> = input.split_whitespace().collect();
    let unknown = || GameError::UnknownCommand(input.trim().to_string());

    let (keyword, rest) = args.split_first().ok_or_else(unknown)?;
    match keyword.to_ascii_lowercase().as_str() {
        PLAY_TOKEN => parse_start(rest, voting),
        MOVE_TOKEN => {
            let (game, rest) = parse_selector(rest);
            match rest {
                [coords] => Ok(Command::Move {
                    game,
                    coords: coords.parse()?,
                }),
                _ => Err(GameError::UnknownCommand("need to play a move".to_string())),
            }
        }
        PASS_TOKEN => Ok(Command::Pass {
            game: parse_only_selector(rest, input)?,
        }),
        VOTE_TOKEN => {
            let (game, rest) = parse_selector(rest);
            match rest {
                [token] if token.eq_ignore_ascii_case(PASS_TOKEN) => Ok(Command::VotePass { game }),
                [coords] => Ok(Command::VoteMove {
                    game,
                    coords: coords.parse::<Coords>()?,
                }),
                _ => Err(GameError::UnknownCommand("need to vote for a move".to_string())),
            }
        }
        RESOLVE_TOKEN => Ok(Command::ResolveNow {
            game: parse_only_selector(rest, input)?,
        }),
        SHOW_TOKEN => Ok(Command::Show {
            game: parse_only_selector(rest, input)?,
        }),
        LIST_TOKEN => match rest {
            [] => Ok(Command::List { all: false }),
            ["all"] => Ok(Command::List { all: true }),
            _ => Err(unknown()),
        },
        VOTING_TOKEN => {
            let (game, rest) = parse_selector(rest);
            match rest {
                ["on"] => Ok(Command::SetVoting { game, enabled: true }),
                ["off"] => Ok(Command::SetVoting { game, enabled: false }),
                _ => Err(unknown()),
            }
        }
        _ => Err(unknown()),
    }
}

fn parse_start(players: &[&str], voting: &VotingConfig) -> Result<Command, GameError> {
    match players {
        [] => {
            let players = Players::anyone();
            let voting = if voting.open_games_vote {
                Voting::every(voting.interval())
            } else {
                Voting::disabled()
            };
            Ok(Command::Start { players, voting })
        }
        [black, white] => Ok(Command::Start {
            players: Players::pair(&parse_user_id(black)?, &parse_user_id(white)?),
            voting: Voting::disabled(),
        }),
        _ => Err(GameError::UnknownCommand(
            "incorrect number of players".to_string(),
        )),
    }
}

/// Accepts both plain names and chat mentions like `<@U123>`.
fn parse_user_id(token: &str) -> Result<String, GameError> {
    let id = if token.starts_with("<@") && token.ends_with('>') {
        &token[2..token.len() - 1]
    } else {
        token
    };
    if id.is_empty() || id.contains(|c: char| c == '<' || c == '>' || c == '@') {
        return Err(GameError::UnknownCommand(format!("{} is not a valid user", token)));
    }
    Ok(id.to_string())
}

fn parse_selector<'a, 'b>(args: &'a [&'b str]) -> (GameSelector, &'a [&'b str]) {
    match args.split_first() {
        Some((first, rest)) => match first.parse::<GameId>() {
            Ok(id) => (GameSelector::Id(id), rest),
            Err(_) => (GameSelector::Auto, args),
        },
        None => (GameSelector::Auto, args),
    }
}

fn parse_only_selector(args: &[&str], input: &str) -> Result<GameSelector, GameError> {
    match parse_selector(args) {
        (game, []) => Ok(game),
        (_, [extra, ..]) => Err(GameError::UnknownCommand(format!(
            "invalid game id {} in {}",
            extra,
            input.trim()
        ))),
    }
}
