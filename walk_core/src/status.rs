//! Session state and the per-fix outcome returned from `on_sample`.

/// Lifecycle state of a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkState {
    /// No walk in progress; fixes are ignored.
    #[default]
    Idle,
    /// Continuous sampling; fixes accumulate distance.
    Walking,
    /// Walker stopped; continuous sampling is off and only periodic re-checks run.
    Holding,
}

/// Why an incoming fix was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Latitude or longitude is NaN or infinite.
    InvalidCoordinate,
    /// No start reference to compare against.
    NoSession,
    /// Timestamp is not after the session start (or the hold start).
    BeforeSessionStart,
    /// Horizontal accuracy is negative or not finite.
    UnknownAccuracy,
    /// Horizontal accuracy is worse than required.
    Inaccurate,
}

/// What `on_sample` did with a fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleOutcome {
    /// Session is idle.
    Ignored,
    /// First fix of the walk; buffered without any checks or events.
    Bootstrapped,
    Rejected(RejectReason),
    /// Walker has not moved far enough yet, but reported speed says moving.
    Stationary,
    /// Walker came to rest; session switched to holding.
    Holding,
    /// Distance advanced by `delta_m` to `total_m`.
    Advanced { delta_m: f64, total_m: f64 },
}

impl SampleOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, SampleOutcome::Rejected(_))
    }
}
