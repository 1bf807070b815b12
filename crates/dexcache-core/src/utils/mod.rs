//! Small pure helpers shared across the crate.

pub mod date;
pub mod ids;
pub mod sprites;

pub use date::{Clock, FixedClock, SystemClock};
pub use ids::{extract_pokemon_id, extract_type_id};
pub use sprites::artwork_url;
