//! Batch engine.
//!
//! Ties the directory layout, the reference resolver chain, and a backend
//! together: every `<texts>/<emotion>/*.txt` becomes
//! `<output>/<emotion>/<backend>-<emotion>-<stem>.wav`.

mod batch;
mod layout;
mod report;

pub use batch::{BatchDriver, list_text_files};
pub use layout::{BatchLayout, SetupError};
pub use report::{BatchReport, CategoryReport, CategoryStatus, ItemReport, ItemStatus, ReportError};
