//! Derived naming convention.
//!
//! These rules must stay byte-for-byte stable: existing stacks are
//! addressed by the names they produce.

pub fn table_name(stack_name: &str) -> String {
    format!("{stack_name}-DataTable")
}

pub fn role_name(stack_name: &str) -> String {
    format!("{stack_name}Role")
}

pub fn container_name(stack_name: &str) -> String {
    format!("{stack_name}Container")
}

pub fn log_stream_prefix(stack_name: &str) -> String {
    format!("{stack_name}Log")
}
