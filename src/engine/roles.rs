use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::error::ConfigError;
use crate::model::player::Role;

/// Largest allowed mafia contingent for a table of `player_count`.
pub fn max_mafia(player_count: usize) -> usize {
    player_count / 3
}

/// Build the role bag (one doctor, one sheriff, `mafia_count` mafia,
/// civilians for the rest) and deal it out with a uniform shuffle.
/// The returned roles are in seat order; output length equals
/// `player_count`.
pub fn assign_roles<R: Rng>(
    player_count: usize,
    mafia_count: usize,
    rng: &mut R,
) -> Result<Vec<Role>, ConfigError> {
    if player_count < 2 {
        return Err(ConfigError::TooFewPlayers(player_count));
    }
    if mafia_count > max_mafia(player_count) {
        return Err(ConfigError::TooManyMafia {
            mafia: mafia_count,
            max: max_mafia(player_count),
            players: player_count,
        });
    }
    if 2 + mafia_count > player_count {
        return Err(ConfigError::InsufficientPlayers {
            mafia: mafia_count,
            players: player_count,
        });
    }

    let mut bag = vec![Role::Doctor, Role::Sheriff];
    bag.extend(std::iter::repeat(Role::Mafia).take(mafia_count));
    bag.extend(std::iter::repeat(Role::Civilian).take(player_count - 2 - mafia_count));

    // SliceRandom::shuffle is Fisher-Yates: every seat gets an equal
    // chance at every role.
    bag.shuffle(rng);

    Ok(bag)
}
