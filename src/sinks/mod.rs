//! Report serialization to flat export files.
mod format;
mod writers;


pub use writers::{Reporter, export_csv, export_json};
