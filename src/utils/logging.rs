use serde::Serialize;

/// Runs `log_action` with a pretty JSON rendering of `value`, only when DEBUG is enabled.
pub(crate) fn with_pretty_json_debug<T, F>(value: &T, log_action: F)
where
    T: Serialize,
    F: FnOnce(&str),
{
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }

    let rendered = serde_json::to_string_pretty(value)
        .unwrap_or_else(|error| format!("<unserializable: {error}>"));
    log_action(rendered.as_str());
}
