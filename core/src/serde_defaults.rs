//! Common serde default value functions

/// Default for enabled fields
pub fn default_true() -> bool {
    true
}

/// Default bound of the tick delivery channel
pub fn default_delivery_capacity() -> usize {
    64
}

/// Default countdown length in seconds
pub fn default_duration_secs() -> i64 {
    60
}
