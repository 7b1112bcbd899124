use serde::{Deserialize, Serialize};

/// Stable identity assigned at game start. All targeting and roster
/// removal is keyed by id, never by name, so duplicate names stay
/// distinct roster entries.
pub type PlayerId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Doctor,
    Sheriff,
    Mafia,
    Civilian,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Doctor => "Doctor",
            Role::Sheriff => "Sheriff",
            Role::Mafia => "Mafia",
            Role::Civilian => "Civilian",
        }
    }
}

/// A seated player. Name and gender come from the setup form; the role
/// is assigned once at game start and never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub gender: Gender,
    pub role: Role,
}

/// A kill or vote target: a living player, or explicitly nobody
/// ("no kill" at night, "no one voted" during the day).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Player(PlayerId),
    Nobody,
}

#[cfg(test)]
mod tests {
    use super::*;

    // The setup screen hands the game screen a serialized player list;
    // every field must survive the trip.
    #[test]
    fn player_list_round_trips_through_json() {
        let players = vec![
            Player {
                id: 0,
                name: "Ana".into(),
                gender: Gender::Female,
                role: Role::Doctor,
            },
            Player {
                id: 1,
                name: "Boris".into(),
                gender: Gender::Male,
                role: Role::Mafia,
            },
        ];

        let json = serde_json::to_string(&players).unwrap();
        let back: Vec<Player> = serde_json::from_str(&json).unwrap();

        assert_eq!(back.len(), 2);
        assert_eq!(back[0].id, 0);
        assert_eq!(back[0].name, "Ana");
        assert_eq!(back[0].gender, Gender::Female);
        assert_eq!(back[0].role, Role::Doctor);
        assert_eq!(back[1].id, 1);
        assert_eq!(back[1].name, "Boris");
        assert_eq!(back[1].gender, Gender::Male);
        assert_eq!(back[1].role, Role::Mafia);
    }
}
