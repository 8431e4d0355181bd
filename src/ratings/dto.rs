use serde::{Deserialize, Serialize};

/// A rating point exactly as Lichess serves it: `[year, month, day, rating]`
/// with a 0-based month. The raw shape is kept on our wire too.
pub type RawPoint = [i64; 4];

/// One game mode's rating time series for a player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameModeHistory {
    pub name: String,
    pub points: Vec<RawPoint>,
}
