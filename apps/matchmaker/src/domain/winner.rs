//! Winner selection policy.
//!
//! Settlement only depends on the [`WinnerSelector`] trait; the policy behind
//! it can change without touching the transactional code.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

/// Picks the winner of a game from its roster.
pub trait WinnerSelector: Send + Sync {
    /// `None` only for an empty roster; otherwise a member of `roster`.
    fn select_winner(&self, roster: &[String]) -> Option<String>;
}

/// Uniform choice over the roster, with a generator seeded from the OS on
/// every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomWinner;

impl WinnerSelector for RandomWinner {
    fn select_winner(&self, roster: &[String]) -> Option<String> {
        select_winner(roster)
    }
}

/// Uniformly random member of `roster`, or `None` if it is empty.
pub fn select_winner(roster: &[String]) -> Option<String> {
    let mut rng = StdRng::from_os_rng();
    roster.choose(&mut rng).cloned()
}
