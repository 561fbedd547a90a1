//! Process exit codes. Scripts rely on these values.

/// Report written (and emailed, when requested).
pub const EXIT_SUCCESS: u8 = 0;

/// Run aborted before an output was produced: unreadable input, missing
/// sheet or columns, write failure, invalid recipient or configuration.
pub const EXIT_ABORT: u8 = 1;

/// Output written, but email delivery failed.
pub const EXIT_DELIVERY_FAILED: u8 = 2;
