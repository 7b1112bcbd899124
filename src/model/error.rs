use thiserror::Error;

use crate::model::player::PlayerId;

/// Rejected before any round starts; the user corrects the setup form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("at least 2 players are required, got {0}")]
    TooFewPlayers(usize),

    #[error("{mafia} mafia exceeds the limit of {max} for {players} players")]
    TooManyMafia {
        mafia: usize,
        max: usize,
        players: usize,
    },

    #[error("insufficient players for requested mafia count ({mafia} mafia, {players} players)")]
    InsufficientPlayers { mafia: usize, players: usize },

    #[error("player {0} needs a name")]
    MissingName(usize),

    #[error("player {0} needs a gender")]
    MissingGender(usize),

    #[error("role bag does not match the roster: {0}")]
    BadRoleBag(String),
}

/// A round-advance attempted with missing or invalid target selections.
/// Nothing is mutated on this path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no {0} has been chosen yet")]
    Missing(&'static str),

    #[error("this choice belongs to the {0} phase")]
    WrongPhase(&'static str),

    #[error("player {0} is not in this game")]
    UnknownPlayer(PlayerId),

    #[error("{0} is no longer alive")]
    NotAlive(String),

    #[error("the mafia cannot target {0}")]
    KillTargetIsMafia(String),

    #[error("the sheriff cannot investigate {0}")]
    InvestigateTargetIsSheriff(String),
}
