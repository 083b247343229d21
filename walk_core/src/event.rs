//! Notifications emitted to the display.

use std::error::Error;

use walk_traits::Coordinate;

#[derive(Debug, Clone, PartialEq)]
pub enum WalkEvent {
    /// The first accepted fix of a walk; emitted once per walk.
    OriginEstablished { origin: Coordinate },
    /// Running total after a distance step; the map re-centers on `recenter`.
    DistanceUpdated { total_m: f64, recenter: Coordinate },
    /// Ask the host to resolve a walking route from `origin` to `current`.
    ///
    /// The resolved path must be handed back tagged with `generation`.
    Waypoint {
        generation: u64,
        origin: Coordinate,
        current: Coordinate,
    },
}

/// A resolved route, tagged with the walk generation that requested it.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOverlay {
    pub generation: u64,
    pub path: Vec<Coordinate>,
}

/// Receiver of walk notifications (map view, console, log).
pub trait DisplaySink {
    fn on_event(&mut self, event: &WalkEvent) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Draw a resolved route. Only routes from the current walk are passed in.
    fn on_route(&mut self, _route: &RouteOverlay) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
