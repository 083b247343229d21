//! Human-readable error descriptions, exit codes and structured JSON errors.

use walk_core::error::{BuildError, WalkError};

/// Lower-cased text of the whole error chain, for heuristics.
fn chain_text(err: &eyre::Report) -> String {
    err.chain()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(": ")
        .to_ascii_lowercase()
}

fn is_config_error(lower: &str) -> bool {
    lower.contains("read config") || lower.contains("parse config") || lower.contains("invalid configuration")
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(BuildError::InvalidConfig(msg)) = err.downcast_ref::<BuildError>() {
        return format!(
            "What happened: Invalid session settings ({msg}).\nLikely causes: Out-of-range values in the [session] or [sampling] tables.\nHow to fix: Edit the config file, then rerun `walkmeter check`."
        );
    }

    if let Some(we) = err.downcast_ref::<WalkError>() {
        return match we {
            WalkError::PermissionDenied => "What happened: Location permission was denied.\nLikely causes: The location source refused requests.\nHow to fix: Grant location access and start a new walk.".to_string(),
            WalkError::ActorGone => "What happened: The walk session stopped unexpectedly.\nLikely causes: The session thread exited early.\nHow to fix: Re-run with --log-level=debug for details.".to_string(),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from config and trace loading
    let msg = err.to_string();
    let lower = chain_text(err);

    if lower.contains("trace csv must have headers") {
        return "Invalid headers in trace CSV. Expected 't_s,lat,lon,accuracy_m,speed_mps'.".to_string();
    }

    if lower.contains("open trace csv") {
        return format!(
            "What happened: The trace file could not be opened.\nLikely causes: Wrong path or missing read permission.\nHow to fix: Check the --trace argument. Original: {msg}"
        );
    }

    if lower.contains("load trace") {
        let detail = err.root_cause();
        return format!(
            "What happened: The trace file is malformed ({detail}).\nLikely causes: Non-numeric values, negative or unordered t_s.\nHow to fix: Fix the listed row and rerun."
        );
    }

    if is_config_error(&lower) {
        let detail = err.root_cause();
        return format!(
            "What happened: Configuration is invalid or unreadable ({detail}).\nLikely causes: Missing file, TOML syntax error or out-of-range values.\nHow to fix: Edit the TOML config and run `walkmeter check`."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Short stable name for the error category (JSON `reason`).
pub fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() {
        return "InvalidConfig";
    }
    if let Some(we) = err.downcast_ref::<WalkError>() {
        return match we {
            WalkError::PermissionDenied => "PermissionDenied",
            WalkError::ActorGone | WalkError::State(_) => "SessionFailed",
            WalkError::Provider(_) | WalkError::Timer(_) | WalkError::Display(_) => "Collaborator",
        };
    }
    let lower = chain_text(err);
    if lower.contains("load trace") || lower.contains("trace csv") {
        return "InvalidTrace";
    }
    if is_config_error(&lower) {
        return "InvalidConfig";
    }
    "Error"
}

/// Stable exit codes per error category; anything unclassified is 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match reason_name(err) {
        "InvalidConfig" => 3,
        "InvalidTrace" => 4,
        "PermissionDenied" => 5,
        "SessionFailed" => 6,
        _ => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;
    json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
