//! Detect whether a tracked branch was rebased, and onto what
//!
//! A proposed new head and new upstream describe a range of history. That range must be a single
//! segment, with exactly one head and one tail, sitting on exactly one upstream commit, for it to
//! describe a rebase. Anything else is rejected rather than guessed at.

mod analyze;
mod candidates;
mod commit_set;

pub use analyze::*;
pub use candidates::*;
pub use commit_set::*;
