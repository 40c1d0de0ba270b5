//! Checkpoint Bridge Exit Checker
//!
//! Verifies a wire-encoded exit proof offline, against checkpoint headers
//! exported to a JSON file, and reports whether the root manager would
//! accept it as a burn by a given withdrawer.
//!
//! The checker runs the same verification as the root manager (checkpoint
//! membership, receipt inclusion, log extraction and predicate validation)
//! but never touches custody or the processed-exit set.

pub mod checker;
pub mod config;
