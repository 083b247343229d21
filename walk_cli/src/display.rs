//! Console rendering of walk events and run summaries.

use std::error::Error;

use serde_json::json;
use walk_core::{DisplaySink, RouteOverlay, WalkEvent};

/// Distance label as shown on the walk screen: whole metres, in km.
pub fn format_km(meters: f64) -> String {
    format!("{} km", meters.round() / 1000.0)
}

/// Prints every event to stdout, as text or as one JSON object per line.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleDisplay {
    json: bool,
}

impl ConsoleDisplay {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    fn render(&self, event: &WalkEvent) -> String {
        match (event, self.json) {
            (WalkEvent::OriginEstablished { origin }, false) => {
                format!("start   {:.6}, {:.6}", origin.latitude, origin.longitude)
            }
            (WalkEvent::OriginEstablished { origin }, true) => json!({
                "event": "origin",
                "lat": origin.latitude,
                "lon": origin.longitude,
            })
            .to_string(),
            (WalkEvent::DistanceUpdated { total_m, recenter }, false) => format!(
                "walked  {:<10} center {:.6}, {:.6}",
                format_km(*total_m),
                recenter.latitude,
                recenter.longitude
            ),
            (WalkEvent::DistanceUpdated { total_m, recenter }, true) => json!({
                "event": "distance",
                "total_m": total_m,
                "center": [recenter.latitude, recenter.longitude],
            })
            .to_string(),
            (
                WalkEvent::Waypoint {
                    generation,
                    origin,
                    current,
                },
                false,
            ) => format!(
                "route   #{generation} {:.6}, {:.6} -> {:.6}, {:.6}",
                origin.latitude, origin.longitude, current.latitude, current.longitude
            ),
            (
                WalkEvent::Waypoint {
                    generation,
                    origin,
                    current,
                },
                true,
            ) => json!({
                "event": "waypoint",
                "generation": generation,
                "origin": [origin.latitude, origin.longitude],
                "current": [current.latitude, current.longitude],
            })
            .to_string(),
        }
    }
}

impl DisplaySink for ConsoleDisplay {
    fn on_event(&mut self, event: &WalkEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        println!("{}", self.render(event));
        Ok(())
    }

    fn on_route(&mut self, route: &RouteOverlay) -> Result<(), Box<dyn Error + Send + Sync>> {
        if self.json {
            println!(
                "{}",
                json!({ "event": "route", "generation": route.generation, "points": route.path.len() })
            );
        } else {
            println!("overlay #{} with {} points", route.generation, route.path.len());
        }
        Ok(())
    }
}

/// What a replay run did, for the closing summary line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub mode: &'static str,
    pub fixes: u64,
    pub delivered: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub holds: u64,
    pub resumes: u64,
    pub total_m: f64,
    pub interrupted: bool,
}

impl RunReport {
    pub fn render(&self, json: bool) -> String {
        if json {
            return json!({
                "event": "summary",
                "mode": self.mode,
                "fixes": self.fixes,
                "delivered": self.delivered,
                "accepted": self.accepted,
                "rejected": self.rejected,
                "holds": self.holds,
                "resumes": self.resumes,
                "total_m": self.total_m,
                "total_km": self.total_m.round() / 1000.0,
                "interrupted": self.interrupted,
            })
            .to_string();
        }
        let mut out = format!(
            "walked {} ({:.1} m) | fixes {} delivered {} accepted {} rejected {} | holds {} resumes {}",
            format_km(self.total_m),
            self.total_m,
            self.fixes,
            self.delivered,
            self.accepted,
            self.rejected,
            self.holds,
            self.resumes
        );
        if self.interrupted {
            out.push_str(" (interrupted)");
        }
        out
    }
}
