//! Pure domain logic: identifiers and winner selection.

pub mod ids;
pub mod winner;

pub use ids::new_id;
pub use winner::{select_winner, RandomWinner, WinnerSelector};
