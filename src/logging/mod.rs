//! Non-blocking request/response logging with secret redaction.
mod entry;
mod redact;
mod writer;


pub use entry::{Direction, LogEntry};
pub use redact::{MASK, Redactor};
pub use writer::RequestLogger;
