use super::errors::AppError;
use super::helpers::MAX_COLUMNS;
use directories::ProjectDirs;
use log::info;
use serde::Deserialize;
use std::fs::File;
use std::io::prelude::*;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, PartialEq, Deserialize)]
pub struct AppConfig {
    #[serde(default = "get_default_voting_config")]
    pub voting: VotingConfig,

    #[serde(default = "get_default_board_config")]
    pub board: BoardConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VotingConfig {
    /// Length of one resolution round for new voting games.
    #[serde(default = "get_default_interval_seconds")]
    pub interval_seconds: u64,
    /// Seed for vote selection; drawn from entropy when missing.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Whether games open to anyone are decided by vote.
    #[serde(default = "get_default_open_games_vote")]
    pub open_games_vote: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BoardConfig {
    #[serde(default = "get_default_board_size")]
    pub size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            voting: get_default_voting_config(),
            board: get_default_board_config(),
        }
    }
}

impl VotingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

pub fn get_app_config(config_path: Option<&str>) -> Result<AppConfig, AppError> {
    let config_file_path: PathBuf = if let Some(str_value) = config_path {
        PathBuf::from(&str_value)
    } else {
        get_default_app_config_path()?
    };

    info!(
        "loading config from '{}'",
        config_file_path.to_string_lossy()
    );

    let config_file_content: String = if config_file_path.exists() {
        let mut file = File::open(&config_file_path).map_err(|e| AppError {
            message: format!(
                "Error opening the file '{}': {}",
                &config_file_path.to_string_lossy(),
                &e.to_string()
            ),
        })?;
        let mut contents = String::new();

        file.read_to_string(&mut contents).map_err(|e| AppError {
            message: format!(
                "Error reading the file '{}': {}",
                &config_file_path.to_string_lossy(),
                &e.to_string()
            ),
        })?;

        contents
    } else {
        "empty: true".to_string()
    };

    parse_app_config(&config_file_content).map_err(|e| AppError {
        message: format!(
            "Error parsing content of the file '{}': {}",
            &config_file_path.to_string_lossy(),
            &e.message
        ),
    })
}

pub fn parse_app_config(content: &str) -> Result<AppConfig, AppError> {
    let config: AppConfig = serde_yaml::from_str(content).map_err(|e| AppError {
        message: e.to_string(),
    })?;

    if config.voting.interval_seconds == 0 {
        return Err(AppError {
            message: "voting.interval_seconds must be positive".to_string(),
        });
    }
    if config.board.size == 0 {
        return Err(AppError {
            message: "board.size must be positive".to_string(),
        });
    }
    if config.board.size > MAX_COLUMNS as usize {
        return Err(AppError {
            message: format!("board.size can be at most {}", MAX_COLUMNS),
        });
    }

    Ok(config)
}

fn get_default_app_config_path() -> Result<PathBuf, AppError> {
    match ProjectDirs::from("Com", "Gogame Vote", env!("CARGO_PKG_NAME")) {
        Some(proj_dirs) => {
            let config_file_path = proj_dirs.config_dir().join("config.yml");

            Ok(config_file_path)
        }
        None => Err(AppError {
            message: "Can't get app project dir".to_string(),
        }),
    }
}

fn get_default_voting_config() -> VotingConfig {
    VotingConfig {
        interval_seconds: get_default_interval_seconds(),
        seed: None,
        open_games_vote: get_default_open_games_vote(),
    }
}

fn get_default_board_config() -> BoardConfig {
    BoardConfig {
        size: get_default_board_size(),
    }
}

fn get_default_interval_seconds() -> u64 {
    3600
}

fn get_default_open_games_vote() -> bool {
    true
}

fn get_default_board_size() -> usize {
    19
}
