//! Merging of the remote session list with the locally cached one.

use super::model::Session;
use std::collections::HashSet;

/// Combines the authoritative remote list with the cached list.
///
/// The result is the remote list in remote order, followed by every cached
/// session whose id the remote list does not contain, in cached order. For an
/// id present in both, the remote entry wins. Duplicate ids inside either
/// input keep their first occurrence, so the output never repeats an id and
/// `merge_sessions(r, &merge_sessions(r, c)) == merge_sessions(r, c)`.
pub fn merge_sessions(remote: &[Session], cached: &[Session]) -> Vec<Session> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(remote.len() + cached.len());
    let mut merged = Vec::with_capacity(remote.len() + cached.len());

    for session in remote.iter().chain(cached.iter()) {
        if seen.insert(session.id.as_str()) {
            merged.push(session.clone());
        }
    }

    merged
}

/// Returns true if any session holds a real exchange.
pub fn has_content_sessions(sessions: &[Session]) -> bool {
    sessions.iter().any(|session| !session.is_placeholder())
}
