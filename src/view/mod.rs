//! Rendered page model and the synchronizer that keeps it in the active language.

mod page;
mod synchronizer;

pub use page::{LanguageControl, NodeKind, Page, ViewNode};
pub use synchronizer::{RepaintOutcome, SyncOutcome, ViewSynchronizer};
