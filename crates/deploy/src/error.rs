//! Formatting of error chains.

use std::error::Error;

/// Returns the messages of `error` and all of its sources.
///
/// A message already contained in the one before it is dropped, so the common `outer: inner`
/// followed by `inner` pattern is reported once.
pub fn dedup_chain(error: &(dyn Error + 'static)) -> Vec<String> {
    let mut causes: Vec<String> = std::iter::successors(Some(error), |&err| err.source())
        .map(|cause| cause.to_string().trim().to_string())
        .collect();
    causes.dedup_by(|b, a| a.contains(b.as_str()));
    causes
}

/// Formats `error` and its sources on one line, separated by `: `.
pub fn display_chain(error: &(dyn Error + 'static)) -> String {
    dedup_chain(error).join(": ")
}
