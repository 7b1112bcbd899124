use crate::engine::llm_client::NarratorSettings;
use crate::model::player::{Gender, Player, PlayerId, Target};
use crate::model::session::{Phase, Verdict};

/// One row of the setup form, before roles exist. The engine validates
/// completeness; the form only collects.
#[derive(Debug, Clone)]
pub struct PlayerSetup {
    pub name: String,
    pub gender: Option<Gender>,
}

pub enum EngineCommand {
    StartGame {
        setup: Vec<PlayerSetup>,
        mafia_count: usize,
    },
    CompleteNight {
        killed: Target,
        saved: PlayerId,
        investigated: PlayerId,
    },
    CompleteVote {
        voted: Target,
    },
    /// Re-issue the narration request for the round that failed; the
    /// stored selections are reused as-is.
    RetryRound,
    UpdateNarrator(NarratorSettings),
}

pub enum EngineResponse {
    GameStarted {
        roster: Vec<Player>,
    },
    RoundAdvanced {
        narration: String,
        roster: Vec<Player>,
        round: u32,
        phase: Phase,
        verdict: Option<Verdict>,
    },
    /// Configuration or selection error; nothing was mutated.
    Rejected {
        reason: String,
    },
    /// The narration service failed; the round is still pending and may
    /// be retried.
    NarrationFailed {
        reason: String,
    },
}
