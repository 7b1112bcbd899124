use crate::model::player::{Player, PlayerId, Target};
use crate::model::session::{GameSession, HistoryEntry, RoundOutcome};

/// Builds the full prompt sent to the narration service.
/// This struct is intentionally dumb: it only formats text.
/// No parsing, no networking, no round logic.
pub struct PromptBuilder;

impl PromptBuilder {
    /// Compose the prompt that completes the current round: the
    /// introduction for round one, a night report for later odd rounds,
    /// a vote report for even rounds.
    pub fn build(session: &GameSession, outcome: RoundOutcome) -> String {
        if session.round() == 1 {
            return Self::build_introduction(session.roster());
        }

        match outcome {
            RoundOutcome::Night {
                killed,
                saved,
                investigated,
            } => Self::build_night_report(session, outcome, killed, saved, investigated),
            RoundOutcome::Vote { voted } => Self::build_vote_report(session, outcome, voted),
        }
    }

    pub fn build_introduction(roster: &[Player]) -> String {
        let mut prompt = String::new();

        push_system_preamble(&mut prompt, roster.len());

        prompt.push_str("The names, genders and roles are as follows:\n\n");
        push_player_list(&mut prompt, roster);

        prompt.push_str(
            "\nThe players do not know their roles yet. After an initial setting \
description, instruct the narrator to ask the players to close their eyes and \
hand each player their role secretly. Mark anything the narrator must do as \
Instructions. End with everyone falling asleep and the narrator asking each \
role to secretly pick someone.\n",
        );

        prompt
    }

    fn build_night_report(
        session: &GameSession,
        outcome: RoundOutcome,
        killed: Target,
        saved: PlayerId,
        investigated: PlayerId,
    ) -> String {
        let mut prompt = String::new();

        push_system_preamble(&mut prompt, session.roster().len());
        push_history_section(&mut prompt, session.history());

        prompt.push_str(&format!("NIGHT {} OUTCOME:\n", session.round()));
        match killed {
            Target::Player(id) => prompt.push_str(&format!(
                "- The mafia targeted {}.\n",
                display_name(session, id)
            )),
            Target::Nobody => prompt.push_str("- The mafia killed no one tonight.\n"),
        }
        prompt.push_str(&format!(
            "- The doctor protected {}.\n",
            display_name(session, saved)
        ));
        prompt.push_str(&format!(
            "- The sheriff investigated {}.\n\n",
            display_name(session, investigated)
        ));

        push_survivors_section(&mut prompt, &session.survivors_after(outcome));

        prompt.push_str(
            "\nNarrate the events of this night for the whole table without \
revealing any living player's role, then instruct the narrator to open the \
discussion for the day's vote.\n",
        );

        prompt
    }

    fn build_vote_report(session: &GameSession, outcome: RoundOutcome, voted: Target) -> String {
        let mut prompt = String::new();

        push_system_preamble(&mut prompt, session.roster().len());
        push_history_section(&mut prompt, session.history());

        prompt.push_str(&format!("DAY {} VOTE:\n", session.round()));
        match voted {
            Target::Player(id) => prompt.push_str(&format!(
                "- The town voted out {}.\n\n",
                display_name(session, id)
            )),
            Target::Nobody => {
                prompt.push_str("- The vote hung; no one was voted out today.\n\n")
            }
        }

        push_survivors_section(&mut prompt, &session.survivors_after(outcome));

        prompt.push_str(
            "\nNarrate the vote's aftermath without revealing any living player's \
role, then instruct the narrator to send everyone to sleep for the coming \
night.\n",
        );

        prompt
    }
}

fn display_name(session: &GameSession, id: PlayerId) -> String {
    session
        .player(id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| format!("player #{id}"))
}

fn push_system_preamble(prompt: &mut String, player_count: usize) {
    prompt.push_str(&format!(
        "We are a group of {player_count} people playing the game Mafia and you \
are writing the narrations read aloud by the game's narrator. Only output the \
narration and instructions, no extra words or responses.\n\n",
    ));
}

fn push_player_list(prompt: &mut String, roster: &[Player]) {
    for (idx, p) in roster.iter().enumerate() {
        prompt.push_str(&format!(
            "Player {}:\n  Name: {}\n  Gender: {}\n  Role: {}\n\n",
            idx + 1,
            p.name,
            p.gender.label(),
            p.role.label(),
        ));
    }
}

fn push_history_section(prompt: &mut String, history: &[HistoryEntry]) {
    if history.is_empty() {
        return;
    }

    prompt.push_str("STORY SO FAR:\n");
    for entry in history {
        prompt.push_str(entry.narration.trim());
        prompt.push_str("\n\n");
    }
}

fn push_survivors_section(prompt: &mut String, survivors: &[&Player]) {
    prompt.push_str("SURVIVING PLAYERS:\n");
    for p in survivors {
        prompt.push_str(&format!("- {} ({})\n", p.name, p.gender.label()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::player::{Gender, Role};
    use crate::model::session::GameSession;

    fn session() -> GameSession {
        let players = vec![
            ("Ana", Role::Doctor),
            ("Boris", Role::Sheriff),
            ("Carla", Role::Mafia),
            ("Dmitri", Role::Civilian),
        ]
        .into_iter()
        .enumerate()
        .map(|(id, (name, role))| Player {
            id,
            name: name.into(),
            gender: Gender::Male,
            role,
        })
        .collect();
        GameSession::new(players).unwrap()
    }

    #[test]
    fn introduction_lists_every_player_with_role() {
        let s = session();
        let prompt = PromptBuilder::build_introduction(s.roster());

        for name in ["Ana", "Boris", "Carla", "Dmitri"] {
            assert!(prompt.contains(name), "missing {name}");
        }
        assert!(prompt.contains("Role: Doctor"));
        assert!(prompt.contains("Role: Mafia"));
        assert!(prompt.contains("close their eyes"));
    }

    #[test]
    fn round_one_always_uses_the_introduction() {
        let mut s = session();
        s.choose_kill(Target::Player(3)).unwrap();
        s.choose_save(0).unwrap();
        s.choose_investigation(2).unwrap();

        let outcome = s.completed_choices().unwrap();
        let prompt = PromptBuilder::build(&s, outcome);

        assert!(prompt.contains("do not know their roles yet"));
        assert!(!prompt.contains("NIGHT 1 OUTCOME"));
    }

    #[test]
    fn night_report_names_targets_and_survivors() {
        let mut s = session();
        s.choose_kill(Target::Nobody).unwrap();
        s.choose_save(0).unwrap();
        s.choose_investigation(2).unwrap();
        s.apply_narration("intro".into(), "the town sleeps".into())
            .unwrap();

        s.choose_vote(Target::Nobody).unwrap();
        s.apply_narration("day".into(), "nobody hangs".into())
            .unwrap();

        // Round 3: the first real night report.
        s.choose_kill(Target::Player(3)).unwrap();
        s.choose_save(1).unwrap();
        s.choose_investigation(2).unwrap();
        let outcome = s.completed_choices().unwrap();
        let prompt = PromptBuilder::build(&s, outcome);

        assert!(prompt.contains("NIGHT 3 OUTCOME"));
        assert!(prompt.contains("The mafia targeted Dmitri"));
        assert!(prompt.contains("The doctor protected Boris"));
        assert!(prompt.contains("The sheriff investigated Carla"));
        // The doomed player is absent from the survivor list.
        assert!(!prompt.contains("- Dmitri"));
        assert!(prompt.contains("- Ana"));
        // The history section carries earlier narrations.
        assert!(prompt.contains("the town sleeps"));
        assert!(prompt.contains("nobody hangs"));
    }

    #[test]
    fn vote_report_covers_both_outcomes() {
        let mut s = session();
        s.choose_kill(Target::Nobody).unwrap();
        s.choose_save(0).unwrap();
        s.choose_investigation(2).unwrap();
        s.apply_narration("intro".into(), "night one".into())
            .unwrap();

        s.choose_vote(Target::Player(2)).unwrap();
        let outcome = s.completed_choices().unwrap();
        let prompt = PromptBuilder::build(&s, outcome);
        assert!(prompt.contains("The town voted out Carla"));
        assert!(!prompt.contains("- Carla ("));

        s.choose_vote(Target::Nobody).unwrap();
        let outcome = s.completed_choices().unwrap();
        let prompt = PromptBuilder::build(&s, outcome);
        assert!(prompt.contains("no one was voted out"));
        assert!(prompt.contains("- Carla ("));
    }
}
