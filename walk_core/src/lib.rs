#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Walking-session core (platform-agnostic).
//!
//! Turns a stream of noisy position fixes into a walked distance. All platform
//! interaction goes through `walk_traits::LocationProvider`,
//! `walk_traits::RecheckTimer` and `event::DisplaySink`.
//!
//! ## Architecture
//!
//! - **Buffer**: bounded history of accepted fixes with best-candidate selection
//! - **Session**: Idle / Walking / Holding state machine (`WalkSession`)
//! - **Configuration**: thresholds and cadences (`config` module)
//! - **Events**: closed set of display notifications (`event` module)
//! - **Hosts**: a threaded actor (`actor`) and a deterministic replay (`runner`)

pub mod actor;
pub mod builder;
pub mod collab_error;
pub mod config;
pub mod conversions;
pub mod error;
pub mod event;
pub mod mocks;
pub mod runner;
pub mod session;
pub mod status;
pub mod timer;

mod buffer;

pub use builder::{Missing, WalkSessionBuilder};
pub use config::{DEFAULT_HOLDING_RULE, HoldingRule, WalkCfg};
pub use event::{DisplaySink, RouteOverlay, WalkEvent};
pub use session::{SessionSnapshot, SessionStats, WalkSession};
pub use status::{RejectReason, SampleOutcome, WalkState};
