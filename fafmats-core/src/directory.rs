/// Read access to the player records the engine works from.
///
/// Storage lives outside this crate. Implementors hand over snapshots of
/// ratings and match history; the engine never writes back.
use crate::types::PlayerId;

pub trait PlayerDirectory {
    /// How a caller picks players (by name, by draft, ...). Opaque to the engine.
    type Selection: ?Sized;

    /// Current rating, `None` if the player doesn't exist.
    fn rating(&self, player: PlayerId) -> Option<f64>;

    /// Number of recorded matches between two players, in either order.
    fn encounter_count(&self, a: PlayerId, b: PlayerId) -> u32;

    fn list_players(&self, selection: &Self::Selection) -> Vec<PlayerId>;
}
