pub mod clock;
pub mod geo;
pub mod sample;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use geo::Coordinate;
pub use sample::PositionSample;

/// Source of position fixes. Samples themselves are delivered back to the
/// session asynchronously; these calls only change what the provider produces.
pub trait LocationProvider {
    fn request_single_sample(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn start_continuous_sampling(
        &mut self,
        min_distance_m: f64,
        min_interval: std::time::Duration,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn stop_continuous_sampling(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Repeating timer whose ticks are fed back to the session as `on_tick`.
pub trait RecheckTimer {
    fn schedule(
        &mut self,
        every: std::time::Duration,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn cancel(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
