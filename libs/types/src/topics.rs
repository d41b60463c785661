//! Logical topic names
//!
//! Topic names are absolute (`/name`). The bus binds each topic to one
//! payload kind at registration time.

/// Default topic carrying the target value.
pub const TARGET_TOPIC: &str = "/target";
/// Default topic carrying the candidate array.
pub const CANDIDATES_TOPIC: &str = "/input";
/// Default topic carrying the computed index pair.
pub const RESULT_TOPIC: &str = "/solution";

/// Queue depth used by every publisher and subscription unless configured.
pub const DEFAULT_QUEUE_DEPTH: usize = 10;

/// Whether `name` is an acceptable topic name: absolute, non-empty segments
/// of ASCII alphanumerics and underscores.
pub fn is_valid_topic_name(name: &str) -> bool {
    let Some(rest) = name.strip_prefix('/') else {
        return false;
    };
    !rest.is_empty()
        && rest.split('/').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}
