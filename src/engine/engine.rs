use std::sync::mpsc::{Receiver, Sender};

use crate::engine::llm_client::{ChatCompletionsClient, NarrationClient, NarratorSettings};
use crate::engine::prompt_builder::PromptBuilder;
use crate::engine::protocol::{EngineCommand, EngineResponse, PlayerSetup};
use crate::engine::roles::assign_roles;
use crate::model::player::{Player, PlayerId, Target};
use crate::model::session::GameSession;

/// Runs on its own thread and owns the game session. The UI talks to it
/// exclusively through the command/response channels, so all session
/// mutation happens strictly between narration requests and only one
/// request is ever in flight.
pub struct Engine {
    rx: Receiver<EngineCommand>,
    tx: Sender<EngineResponse>,
    client: Box<dyn NarrationClient>,
    session: Option<GameSession>,
}

impl Engine {
    pub fn new(
        rx: Receiver<EngineCommand>,
        tx: Sender<EngineResponse>,
        settings: NarratorSettings,
    ) -> Self {
        Self::with_client(rx, tx, Box::new(ChatCompletionsClient::new(settings)))
    }

    pub fn with_client(
        rx: Receiver<EngineCommand>,
        tx: Sender<EngineResponse>,
        client: Box<dyn NarrationClient>,
    ) -> Self {
        Self {
            rx,
            tx,
            client,
            session: None,
        }
    }

    pub fn run(&mut self) {
        while let Ok(cmd) = self.rx.recv() {
            let resp = self.handle(cmd);
            if let Some(resp) = resp {
                let _ = self.tx.send(resp);
            }
        }
    }

    fn handle(&mut self, cmd: EngineCommand) -> Option<EngineResponse> {
        match cmd {
            EngineCommand::StartGame { setup, mafia_count } => {
                Some(self.start_game(setup, mafia_count))
            }
            EngineCommand::CompleteNight {
                killed,
                saved,
                investigated,
            } => Some(self.complete_night(killed, saved, investigated)),
            EngineCommand::CompleteVote { voted } => Some(self.complete_vote(voted)),
            EngineCommand::RetryRound => Some(self.advance_round()),
            EngineCommand::UpdateNarrator(settings) => {
                log::info!("narrator settings updated ({})", settings.endpoint);
                self.client = Box::new(ChatCompletionsClient::new(settings));
                None
            }
        }
    }

    fn start_game(&mut self, setup: Vec<PlayerSetup>, mafia_count: usize) -> EngineResponse {
        let mut seats = Vec::with_capacity(setup.len());
        for (idx, row) in setup.iter().enumerate() {
            let name = row.name.trim();
            if name.is_empty() {
                return EngineResponse::Rejected {
                    reason: format!("player {} needs a name", idx + 1),
                };
            }
            let Some(gender) = row.gender else {
                return EngineResponse::Rejected {
                    reason: format!("player {} needs a gender", idx + 1),
                };
            };
            seats.push((name.to_string(), gender));
        }

        let mut rng = rand::thread_rng();
        let roles = match assign_roles(seats.len(), mafia_count, &mut rng) {
            Ok(roles) => roles,
            Err(e) => return EngineResponse::Rejected {
                reason: e.to_string(),
            },
        };

        let players: Vec<Player> = seats
            .into_iter()
            .zip(roles)
            .enumerate()
            .map(|(id, ((name, gender), role))| Player {
                id,
                name,
                gender,
                role,
            })
            .collect();

        match GameSession::new(players) {
            Ok(session) => {
                let roster = session.roster().to_vec();
                log::info!("game started with {} players", roster.len());
                self.session = Some(session);
                EngineResponse::GameStarted { roster }
            }
            Err(e) => EngineResponse::Rejected {
                reason: e.to_string(),
            },
        }
    }

    fn complete_night(
        &mut self,
        killed: Target,
        saved: PlayerId,
        investigated: PlayerId,
    ) -> EngineResponse {
        let Some(session) = self.session.as_mut() else {
            return EngineResponse::Rejected {
                reason: "no game in progress".into(),
            };
        };

        if let Err(e) = session.choose_kill(killed) {
            return EngineResponse::Rejected {
                reason: e.to_string(),
            };
        }
        if let Err(e) = session.choose_save(saved) {
            return EngineResponse::Rejected {
                reason: e.to_string(),
            };
        }
        if let Err(e) = session.choose_investigation(investigated) {
            return EngineResponse::Rejected {
                reason: e.to_string(),
            };
        }

        self.advance_round()
    }

    fn complete_vote(&mut self, voted: Target) -> EngineResponse {
        let Some(session) = self.session.as_mut() else {
            return EngineResponse::Rejected {
                reason: "no game in progress".into(),
            };
        };

        if let Err(e) = session.choose_vote(voted) {
            return EngineResponse::Rejected {
                reason: e.to_string(),
            };
        }

        self.advance_round()
    }

    /// Compose the round prompt, ask the service for narration, and only
    /// then commit the round. A service failure leaves the session
    /// exactly as it was.
    fn advance_round(&mut self) -> EngineResponse {
        let Some(session) = self.session.as_mut() else {
            return EngineResponse::Rejected {
                reason: "no game in progress".into(),
            };
        };

        let outcome = match session.completed_choices() {
            Ok(outcome) => outcome,
            Err(e) => return EngineResponse::Rejected {
                reason: e.to_string(),
            },
        };

        let prompt = PromptBuilder::build(session, outcome);
        log::debug!("round {} prompt:\n{}", session.round(), prompt);

        let narration = match self.client.narrate(&prompt) {
            Ok(text) => text,
            Err(e) => {
                log::error!("narration service failure: {e}");
                return EngineResponse::NarrationFailed {
                    reason: e.to_string(),
                };
            }
        };

        if let Err(e) = session.apply_narration(prompt, narration.clone()) {
            return EngineResponse::Rejected {
                reason: e.to_string(),
            };
        }

        log::info!(
            "advanced to round {} ({} players alive)",
            session.round(),
            session.roster().len()
        );

        EngineResponse::RoundAdvanced {
            narration,
            roster: session.roster().to_vec(),
            round: session.round(),
            phase: session.phase(),
            verdict: session.verdict(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::llm_client::NarrationError;
    use crate::model::player::{Gender, Role};
    use crate::model::session::Phase;
    use std::collections::VecDeque;
    use std::sync::mpsc;
    use std::sync::Mutex;

    /// Replays a scripted sequence of narration results.
    struct ScriptedClient {
        script: Mutex<VecDeque<Result<String, NarrationError>>>,
    }

    impl ScriptedClient {
        fn new(script: Vec<Result<String, NarrationError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
            }
        }
    }

    impl NarrationClient for ScriptedClient {
        fn narrate(&self, _prompt: &str) -> Result<String, NarrationError> {
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(NarrationError::EmptyResponse))
        }
    }

    fn engine(
        script: Vec<Result<String, NarrationError>>,
    ) -> (Engine, mpsc::Sender<EngineCommand>, mpsc::Receiver<EngineResponse>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let engine = Engine::with_client(cmd_rx, resp_tx, Box::new(ScriptedClient::new(script)));
        (engine, cmd_tx, resp_rx)
    }

    fn setup_rows(n: usize) -> Vec<PlayerSetup> {
        (0..n)
            .map(|i| PlayerSetup {
                name: format!("Player{i}"),
                gender: Some(Gender::Female),
            })
            .collect()
    }

    fn start(engine: &mut Engine, n: usize, mafia: usize) -> Vec<Player> {
        match engine.handle(EngineCommand::StartGame {
            setup: setup_rows(n),
            mafia_count: mafia,
        }) {
            Some(EngineResponse::GameStarted { roster }) => roster,
            other => panic!("expected GameStarted, got {:?}", kind(&other)),
        }
    }

    fn kind(resp: &Option<EngineResponse>) -> &'static str {
        match resp {
            Some(EngineResponse::GameStarted { .. }) => "GameStarted",
            Some(EngineResponse::RoundAdvanced { .. }) => "RoundAdvanced",
            Some(EngineResponse::Rejected { .. }) => "Rejected",
            Some(EngineResponse::NarrationFailed { .. }) => "NarrationFailed",
            None => "None",
        }
    }

    #[test]
    fn start_game_deals_the_requested_role_bag() {
        let (mut engine, _tx, _rx) = engine(vec![]);
        let roster = start(&mut engine, 6, 1);

        assert_eq!(roster.len(), 6);
        let count =
            |role: Role| roster.iter().filter(|p| p.role == role).count();
        assert_eq!(count(Role::Doctor), 1);
        assert_eq!(count(Role::Sheriff), 1);
        assert_eq!(count(Role::Mafia), 1);
        assert_eq!(count(Role::Civilian), 3);
    }

    #[test]
    fn start_game_rejects_incomplete_rows_and_bad_counts() {
        let (mut engine, _tx, _rx) = engine(vec![]);

        let mut rows = setup_rows(6);
        rows[2].gender = None;
        let resp = engine.handle(EngineCommand::StartGame {
            setup: rows,
            mafia_count: 1,
        });
        assert!(matches!(
            resp,
            Some(EngineResponse::Rejected { reason }) if reason.contains("gender")
        ));

        let resp = engine.handle(EngineCommand::StartGame {
            setup: setup_rows(6),
            mafia_count: 3,
        });
        assert!(matches!(resp, Some(EngineResponse::Rejected { .. })));
    }

    #[test]
    fn narration_failure_leaves_the_round_pending_for_retry() {
        let (mut engine, _tx, _rx) = engine(vec![
            Err(NarrationError::EmptyResponse),
            Ok("the sun rises".into()),
        ]);
        let roster = start(&mut engine, 6, 1);
        let civilian = roster
            .iter()
            .find(|p| p.role == Role::Civilian)
            .unwrap()
            .id;
        let doctor = roster.iter().find(|p| p.role == Role::Doctor).unwrap().id;
        let mafia = roster.iter().find(|p| p.role == Role::Mafia).unwrap().id;

        // First attempt fails; nothing advances.
        let resp = engine.handle(EngineCommand::CompleteNight {
            killed: Target::Player(civilian),
            saved: doctor,
            investigated: mafia,
        });
        assert!(matches!(
            resp,
            Some(EngineResponse::NarrationFailed { .. })
        ));

        // Retry reuses the stored selections and succeeds.
        match engine.handle(EngineCommand::RetryRound) {
            Some(EngineResponse::RoundAdvanced {
                narration,
                roster,
                round,
                phase,
                ..
            }) => {
                assert_eq!(narration, "the sun rises");
                assert_eq!(round, 2);
                assert_eq!(phase, Phase::Vote);
                // Kill target != save target, so the victim is gone.
                assert_eq!(roster.len(), 5);
                assert!(!roster.iter().any(|p| p.id == civilian));
            }
            other => panic!("expected RoundAdvanced, got {:?}", kind(&other)),
        }
    }

    #[test]
    fn vote_round_flows_through_to_a_verdict() {
        let (mut engine, _tx, _rx) = engine(vec![
            Ok("night one".into()),
            Ok("the town turns on its own".into()),
        ]);
        let roster = start(&mut engine, 6, 1);
        let doctor = roster.iter().find(|p| p.role == Role::Doctor).unwrap().id;
        let mafia = roster.iter().find(|p| p.role == Role::Mafia).unwrap().id;

        let resp = engine.handle(EngineCommand::CompleteNight {
            killed: Target::Nobody,
            saved: doctor,
            investigated: mafia,
        });
        assert!(matches!(
            resp,
            Some(EngineResponse::RoundAdvanced { round: 2, .. })
        ));

        match engine.handle(EngineCommand::CompleteVote {
            voted: Target::Player(mafia),
        }) {
            Some(EngineResponse::RoundAdvanced {
                round,
                roster,
                verdict,
                ..
            }) => {
                assert_eq!(round, 3);
                assert_eq!(roster.len(), 5);
                assert_eq!(verdict, Some(crate::model::session::Verdict::TownWins));
            }
            other => panic!("expected RoundAdvanced, got {:?}", kind(&other)),
        }
    }

    #[test]
    fn selection_errors_are_rejected_without_calling_the_service() {
        let (mut engine, _tx, _rx) = engine(vec![Ok("should never be used".into())]);
        let roster = start(&mut engine, 6, 1);
        let mafia = roster.iter().find(|p| p.role == Role::Mafia).unwrap().id;
        let doctor = roster.iter().find(|p| p.role == Role::Doctor).unwrap().id;

        // Mafia as kill target is invalid.
        let resp = engine.handle(EngineCommand::CompleteNight {
            killed: Target::Player(mafia),
            saved: doctor,
            investigated: mafia,
        });
        assert!(matches!(resp, Some(EngineResponse::Rejected { .. })));

        // Voting before night one is complete is a phase error.
        let resp = engine.handle(EngineCommand::CompleteVote {
            voted: Target::Nobody,
        });
        assert!(matches!(resp, Some(EngineResponse::Rejected { .. })));
    }

    #[test]
    fn commands_without_a_game_are_rejected() {
        let (mut engine, _tx, _rx) = engine(vec![]);
        let resp = engine.handle(EngineCommand::RetryRound);
        assert!(matches!(
            resp,
            Some(EngineResponse::Rejected { reason }) if reason.contains("no game")
        ));
    }
}
