/// Errors raised while interpreting the two embedded JSON blocks.
///
/// ```text
/// ┌──────────────────────────┬─────────────────────────────────────────────┐
/// │ Variant                  │ Cause                                       │
/// ├──────────────────────────┼─────────────────────────────────────────────┤
/// │ MalformedJson            │ block text is not valid JSON                │
/// │ MissingRequiredParameter │ pwmirqfrq / pwmmax absent after parsing     │
/// │ InvalidSchema            │ schema entry unusable, or no wire fields    │
/// └──────────────────────────┴─────────────────────────────────────────────┘
/// ```
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    /// The extracted block was brace-balanced but not parseable JSON.
    #[error("{block} block is not valid JSON: {source}")]
    MalformedJson {
        block: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A parameter the decoder cannot run without was not supplied.
    ///
    /// Both the sample frequency and the PWM maximum must resolve to a
    /// non-zero value, either directly or through the legacy `pwmfrq` key.
    #[error("required parameter {name} is missing")]
    MissingRequiredParameter { name: &'static str },

    #[error("invalid message schema: {reason}")]
    InvalidSchema { reason: String },
}
