//! Bookkeeping for peer-to-peer rendezvous requests.
//!
//! The server only relays. When A asks to reach B, a
//! [`PendingRendezvous`] is recorded; when B answers READY with a port,
//! the record is consumed and A is told where to dial. Records carry a
//! creation time and expire after a TTL, so an unanswered request never
//! hangs around forever.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Where a pending request stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendezvousState {
    /// START was relayed to the target; waiting for READY.
    Requested,
    /// The target answered. The record is consumed right after.
    Ready,
}

/// One outstanding request from `requester` to reach `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRendezvous {
    pub requester: String,
    pub target: String,
    pub state: RendezvousState,
    pub created_at: Instant,
}

/// Errors from the rendezvous table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RendezvousError {
    /// READY arrived for a request that doesn't exist or has expired.
    #[error("no pending rendezvous from {requester} to {target}")]
    NoPendingRequest { requester: String, target: String },
}

/// All pending requests, keyed by `(requester, target)`.
///
/// Like the other registries this is a plain struct. The server guards
/// it with a mutex because the two halves of a rendezvous run on two
/// unrelated connection tasks.
#[derive(Debug)]
pub struct RendezvousTable {
    pending: HashMap<(String, String), PendingRendezvous>,
    ttl: Duration,
}

impl RendezvousTable {
    pub fn new(ttl: Duration) -> Self {
        Self {
            pending: HashMap::new(),
            ttl,
        }
    }

    /// Records that `requester` wants to reach `target`.
    ///
    /// Asking again for the same pair restarts the clock. Returns `true`
    /// if an existing record was refreshed.
    pub fn request(&mut self, requester: &str, target: &str) -> bool {
        self.purge_expired();
        let record = PendingRendezvous {
            requester: requester.to_string(),
            target: target.to_string(),
            state: RendezvousState::Requested,
            created_at: Instant::now(),
        };
        self.pending
            .insert((requester.to_string(), target.to_string()), record)
            .is_some()
    }

    /// Consumes the request from `requester` to `target` because the
    /// target is ready.
    ///
    /// # Errors
    /// [`RendezvousError::NoPendingRequest`] if there is no live record.
    pub fn ready(&mut self, requester: &str, target: &str) -> Result<PendingRendezvous, RendezvousError> {
        self.purge_expired();
        let mut record = self
            .pending
            .remove(&(requester.to_string(), target.to_string()))
            .ok_or_else(|| RendezvousError::NoPendingRequest {
                requester: requester.to_string(),
                target: target.to_string(),
            })?;
        record.state = RendezvousState::Ready;
        Ok(record)
    }

    /// Drops a single request.
    pub fn cancel(&mut self, requester: &str, target: &str) -> bool {
        self.pending
            .remove(&(requester.to_string(), target.to_string()))
            .is_some()
    }

    /// Drops every request involving `pseudo`, on either side.
    ///
    /// Returns the requesters that were waiting on `pseudo`, so they can
    /// be told their peer is gone. Requests *made by* `pseudo` vanish
    /// silently.
    pub fn forget(&mut self, pseudo: &str) -> Vec<String> {
        self.purge_expired();
        let mut waiting = Vec::new();
        self.pending.retain(|(requester, target), _| {
            if target == pseudo {
                waiting.push(requester.clone());
                false
            } else {
                requester != pseudo
            }
        });
        waiting.sort();
        waiting
    }

    /// Removes requests older than the TTL. Returns how many went.
    pub fn purge_expired(&mut self) -> usize {
        let ttl = self.ttl;
        let before = self.pending.len();
        self.pending.retain(|_, r| r.created_at.elapsed() < ttl);
        let purged = before - self.pending.len();
        if purged > 0 {
            tracing::debug!(purged, "expired rendezvous requests");
        }
        purged
    }

    pub fn get(&self, requester: &str, target: &str) -> Option<&PendingRendezvous> {
        self.pending
            .get(&(requester.to_string(), target.to_string()))
            .filter(|r| r.created_at.elapsed() < self.ttl)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RendezvousTable {
        RendezvousTable::new(Duration::from_secs(3600))
    }

    #[test]
    fn test_request_then_ready_consumes_record() {
        let mut t = table();
        assert!(!t.request("ann", "bob"));
        assert_eq!(t.get("ann", "bob").unwrap().state, RendezvousState::Requested);

        let record = t.ready("ann", "bob").unwrap();

        assert_eq!(record.state, RendezvousState::Ready);
        assert_eq!(record.requester, "ann");
        assert_eq!(record.target, "bob");
        assert!(t.is_empty());
    }

    #[test]
    fn test_ready_without_request() {
        let mut t = table();
        assert_eq!(
            t.ready("ann", "bob"),
            Err(RendezvousError::NoPendingRequest {
                requester: "ann".into(),
                target: "bob".into()
            })
        );
    }

    #[test]
    fn test_ready_is_directional() {
        let mut t = table();
        t.request("ann", "bob");
        assert!(t.ready("bob", "ann").is_err());
        assert!(t.ready("ann", "bob").is_ok());
    }

    #[test]
    fn test_request_twice_refreshes() {
        let mut t = table();
        t.request("ann", "bob");
        assert!(t.request("ann", "bob"));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_expired_request_cannot_be_readied() {
        let mut t = RendezvousTable::new(Duration::ZERO);
        t.request("ann", "bob");
        assert!(t.get("ann", "bob").is_none());
        assert!(t.ready("ann", "bob").is_err());
        assert!(t.is_empty());
    }

    #[test]
    fn test_forget_reports_waiting_requesters() {
        let mut t = table();
        t.request("ann", "bob");
        t.request("cid", "bob");
        t.request("bob", "dan");
        t.request("eve", "dan");

        let waiting = t.forget("bob");

        assert_eq!(waiting, ["ann", "cid"]);
        assert_eq!(t.len(), 1);
        assert!(t.get("eve", "dan").is_some());
    }

    #[test]
    fn test_cancel_single_request() {
        let mut t = table();
        t.request("ann", "bob");
        assert!(t.cancel("ann", "bob"));
        assert!(!t.cancel("ann", "bob"));
    }
}
