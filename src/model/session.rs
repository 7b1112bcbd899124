use crate::model::error::{ConfigError, SelectionError};
use crate::model::player::{Player, PlayerId, Role, Target};

/// Round phase, derived from round parity: odd rounds are night rounds,
/// even rounds are vote rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Night,
    Vote,
}

impl Phase {
    pub fn of_round(round: u32) -> Self {
        if round % 2 == 1 {
            Phase::Night
        } else {
            Phase::Vote
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Night => "Night",
            Phase::Vote => "Vote",
        }
    }
}

/// Selections collected for the current round. Cleared on every advance.
#[derive(Debug, Clone, Default)]
struct PendingChoices {
    killed: Option<Target>,
    saved: Option<PlayerId>,
    investigated: Option<PlayerId>,
    voted: Option<Target>,
}

/// The validated set of selections that completes the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    Night {
        killed: Target,
        saved: PlayerId,
        investigated: PlayerId,
    },
    Vote {
        voted: Target,
    },
}

/// One completed round: the prompt that was sent and the narration that
/// came back. Appended only after the narration service answered.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub prompt: String,
    pub narration: String,
}

/// Advisory end-of-game call. The session never refuses to keep
/// advancing; the UI just shows a banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    TownWins,
    MafiaWins,
}

/// The round state machine. Owns the living roster, the round counter,
/// the pending per-round selections and the cumulative narration history.
/// Mutates only its own fields; the UI never reaches in.
#[derive(Debug)]
pub struct GameSession {
    roster: Vec<Player>,
    eliminated: Vec<Player>,
    round: u32,
    pending: PendingChoices,
    history: Vec<HistoryEntry>,
}

impl GameSession {
    pub fn new(players: Vec<Player>) -> Result<Self, ConfigError> {
        if players.len() < 2 {
            return Err(ConfigError::TooFewPlayers(players.len()));
        }
        for (idx, p) in players.iter().enumerate() {
            if p.name.trim().is_empty() {
                return Err(ConfigError::MissingName(idx + 1));
            }
        }

        let count = |role: Role| players.iter().filter(|p| p.role == role).count();
        if count(Role::Doctor) != 1 {
            return Err(ConfigError::BadRoleBag(
                "expected exactly one doctor".into(),
            ));
        }
        if count(Role::Sheriff) != 1 {
            return Err(ConfigError::BadRoleBag(
                "expected exactly one sheriff".into(),
            ));
        }

        Ok(Self {
            roster: players,
            eliminated: Vec::new(),
            round: 1,
            pending: PendingChoices::default(),
            history: Vec::new(),
        })
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn phase(&self) -> Phase {
        Phase::of_round(self.round)
    }

    pub fn roster(&self) -> &[Player] {
        &self.roster
    }

    pub fn eliminated(&self) -> &[Player] {
        &self.eliminated
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn is_alive(&self, id: PlayerId) -> bool {
        self.roster.iter().any(|p| p.id == id)
    }

    fn living(&self, id: PlayerId) -> Result<&Player, SelectionError> {
        if let Some(p) = self.roster.iter().find(|p| p.id == id) {
            return Ok(p);
        }
        match self.eliminated.iter().find(|p| p.id == id) {
            Some(p) => Err(SelectionError::NotAlive(p.name.clone())),
            None => Err(SelectionError::UnknownPlayer(id)),
        }
    }

    fn require_phase(&self, phase: Phase) -> Result<(), SelectionError> {
        if self.phase() == phase {
            Ok(())
        } else {
            Err(SelectionError::WrongPhase(match phase {
                Phase::Night => "night",
                Phase::Vote => "vote",
            }))
        }
    }

    /// The mafia's pick: a living non-mafia player, or nobody.
    pub fn choose_kill(&mut self, target: Target) -> Result<(), SelectionError> {
        self.require_phase(Phase::Night)?;
        if let Target::Player(id) = target {
            let p = self.living(id)?;
            if p.role == Role::Mafia {
                return Err(SelectionError::KillTargetIsMafia(p.name.clone()));
            }
        }
        self.pending.killed = Some(target);
        Ok(())
    }

    /// The doctor's pick: any living player, themselves included.
    pub fn choose_save(&mut self, id: PlayerId) -> Result<(), SelectionError> {
        self.require_phase(Phase::Night)?;
        self.living(id)?;
        self.pending.saved = Some(id);
        Ok(())
    }

    /// The sheriff's pick: any living player other than the sheriff.
    pub fn choose_investigation(&mut self, id: PlayerId) -> Result<(), SelectionError> {
        self.require_phase(Phase::Night)?;
        let p = self.living(id)?;
        if p.role == Role::Sheriff {
            return Err(SelectionError::InvestigateTargetIsSheriff(p.name.clone()));
        }
        self.pending.investigated = Some(id);
        Ok(())
    }

    /// The table's pick: a living player, or nobody if the vote hung.
    pub fn choose_vote(&mut self, target: Target) -> Result<(), SelectionError> {
        self.require_phase(Phase::Vote)?;
        if let Target::Player(id) = target {
            self.living(id)?;
        }
        self.pending.voted = Some(target);
        Ok(())
    }

    /// The transition gate: the round may only complete once every
    /// selection for the current phase is present.
    pub fn completed_choices(&self) -> Result<RoundOutcome, SelectionError> {
        match self.phase() {
            Phase::Night => Ok(RoundOutcome::Night {
                killed: self
                    .pending
                    .killed
                    .ok_or(SelectionError::Missing("kill target"))?,
                saved: self
                    .pending
                    .saved
                    .ok_or(SelectionError::Missing("save target"))?,
                investigated: self
                    .pending
                    .investigated
                    .ok_or(SelectionError::Missing("investigation target"))?,
            }),
            Phase::Vote => Ok(RoundOutcome::Vote {
                voted: self
                    .pending
                    .voted
                    .ok_or(SelectionError::Missing("vote target"))?,
            }),
        }
    }

    /// Who leaves the roster when this outcome is committed. A night kill
    /// only sticks when the doctor picked someone else.
    fn removal_for(outcome: RoundOutcome) -> Option<PlayerId> {
        match outcome {
            RoundOutcome::Night { killed, saved, .. } => match killed {
                Target::Player(id) if id != saved => Some(id),
                _ => None,
            },
            RoundOutcome::Vote { voted } => match voted {
                Target::Player(id) => Some(id),
                Target::Nobody => None,
            },
        }
    }

    /// The roster as it will look after the pending outcome is applied.
    /// Used for the "survivors" section of round prompts.
    pub fn survivors_after(&self, outcome: RoundOutcome) -> Vec<&Player> {
        let removed = Self::removal_for(outcome);
        self.roster
            .iter()
            .filter(|p| Some(p.id) != removed)
            .collect()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.roster
            .iter()
            .chain(self.eliminated.iter())
            .find(|p| p.id == id)
    }

    /// Commit the current round with the narration that just came back.
    ///
    /// The caller receives the response first, then this appends it to
    /// history, then the UI sees it. A failed narration request never
    /// reaches this method, so the roster, round counter and history
    /// stay untouched on that path.
    pub fn apply_narration(
        &mut self,
        prompt: String,
        narration: String,
    ) -> Result<(), SelectionError> {
        let outcome = self.completed_choices()?;

        if let Some(id) = Self::removal_for(outcome) {
            if let Some(pos) = self.roster.iter().position(|p| p.id == id) {
                let gone = self.roster.remove(pos);
                self.eliminated.push(gone);
            }
        }

        self.history.push(HistoryEntry { prompt, narration });
        self.round += 1;
        self.pending = PendingChoices::default();
        Ok(())
    }

    /// Advisory only: town wins once no mafia remains; mafia wins once
    /// they match or outnumber everyone else.
    pub fn verdict(&self) -> Option<Verdict> {
        let mafia = self
            .roster
            .iter()
            .filter(|p| p.role == Role::Mafia)
            .count();
        let others = self.roster.len() - mafia;

        if mafia == 0 {
            Some(Verdict::TownWins)
        } else if mafia >= others {
            Some(Verdict::MafiaWins)
        } else {
            None
        }
    }
}
