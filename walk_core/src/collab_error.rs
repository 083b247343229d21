//! Maps `Box<dyn Error>` from collaborator trait boundaries to typed `WalkError`.
//!
//! The traits in `walk_traits` use `Box<dyn Error + Send + Sync>` so any host
//! can plug in; this module converts those to our typed error enum, with an
//! optional feature-gated path for `walk_provider::error::ProviderError`.

use crate::error::WalkError;

/// Which collaborator a failed call went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    Provider,
    Timer,
    Display,
}

/// Map a trait-boundary error to a typed `WalkError`.
///
/// Attempts to downcast known provider error types first, then falls back
/// to string-based heuristics.
pub fn map_collaborator_error(
    who: Collaborator,
    e: &(dyn std::error::Error + 'static),
) -> WalkError {
    // Feature-gated: try to downcast to ProviderError for precise mapping
    #[cfg(feature = "provider-errors")]
    {
        if let Some(pe) = e.downcast_ref::<walk_provider::error::ProviderError>() {
            return match pe {
                walk_provider::error::ProviderError::PermissionDenied => {
                    WalkError::PermissionDenied
                }
                other => WalkError::Provider(other.to_string()),
            };
        }
    }

    // Fallback: string-based detection
    let s = e.to_string();
    match who {
        Collaborator::Provider if s.to_lowercase().contains("permission") => {
            WalkError::PermissionDenied
        }
        Collaborator::Provider => WalkError::Provider(s),
        Collaborator::Timer => WalkError::Timer(s),
        Collaborator::Display => WalkError::Display(s),
    }
}
