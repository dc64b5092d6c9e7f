//! One-vote-per-IP-per-domain ledger.
//!
//! Process memory only: a restart resets every voting right.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Set of `(ip, domain)` pairs that have already voted
#[derive(Debug, Default)]
pub struct VoteLedger {
    votes: Mutex<HashSet<(String, String)>>,
}

impl VoteLedger {
    /// Create an empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `ip` has voted for `domain`
    pub fn has_voted(&self, ip: &str, domain: &str) -> bool {
        self.lock()
            .contains(&(ip.to_string(), domain.to_string()))
    }

    /// Record a vote. Idempotent.
    ///
    /// Returns true if this call recorded a new vote, false if the pair had
    /// already voted. Check and insert happen under one lock, so two
    /// concurrent callers for the same pair cannot both get `true`.
    pub fn record_vote(&self, ip: &str, domain: &str) -> bool {
        self.lock().insert((ip.to_string(), domain.to_string()))
    }

    /// Withdraw a vote; returns true if one was present
    pub fn forget(&self, ip: &str, domain: &str) -> bool {
        self.lock()
            .remove(&(ip.to_string(), domain.to_string()))
    }

    /// Remove every vote
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of recorded votes
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nobody has voted
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<(String, String)>> {
        self.votes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_vote_is_recorded_per_domain() {
        let ledger = VoteLedger::new();
        assert!(ledger.record_vote("10.0.0.1", "a.com"));
        assert!(ledger.has_voted("10.0.0.1", "a.com"));
        assert!(!ledger.has_voted("10.0.0.1", "b.com"));
    }

    #[test]
    fn test_record_vote_is_idempotent() {
        let ledger = VoteLedger::new();
        assert!(ledger.record_vote("10.0.0.1", "a.com"));
        for _ in 0..5 {
            assert!(!ledger.record_vote("10.0.0.1", "a.com"));
        }
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_ips_and_domains_are_independent() {
        let ledger = VoteLedger::new();
        assert!(ledger.record_vote("10.0.0.1", "a.com"));
        assert!(ledger.record_vote("10.0.0.1", "b.com"));
        assert!(ledger.record_vote("10.0.0.2", "a.com"));
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_ipv6_addresses_do_not_collide() {
        let ledger = VoteLedger::new();
        assert!(ledger.record_vote("::1", "a:b.com"));
        assert!(!ledger.has_voted("::1:a", "b.com"));
    }

    #[test]
    fn test_forget_and_clear() {
        let ledger = VoteLedger::new();
        ledger.record_vote("10.0.0.1", "a.com");
        ledger.record_vote("10.0.0.2", "a.com");

        assert!(ledger.forget("10.0.0.1", "a.com"));
        assert!(!ledger.forget("10.0.0.1", "a.com"));
        assert!(!ledger.has_voted("10.0.0.1", "a.com"));

        ledger.clear();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_concurrent_votes_for_same_pair_succeed_once() {
        let ledger = Arc::new(VoteLedger::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || ledger.record_vote("10.0.0.9", "race.com"))
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&won| won)
            .count();
        assert_eq!(wins, 1);
        assert_eq!(ledger.len(), 1);
    }
}
