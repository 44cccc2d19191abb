//! Simulated document host.

use crate::fault::FaultPlan;
use crate::kernel::SimSession;
use recast_core::{CoreError, CoreResult, LogId};
use recast_replay::{DocumentHost, ModelingSession};
use serde::{Deserialize, Serialize};

/// Open/close bookkeeping of a [`SimHost`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostStats {
    /// Documents opened, in order
    pub opened: Vec<String>,
    /// Documents closed, in order
    pub closed: Vec<String>,
    /// History length of each document when it was closed
    pub closed_history: Vec<usize>,
}

impl HostStats {
    /// Documents currently open
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.opened.len().saturating_sub(self.closed.len())
    }

    /// How many times the document for `log` was closed
    #[must_use]
    pub fn close_count(&self, log: &str) -> usize {
        self.closed.iter().filter(|name| name.as_str() == log).count()
    }
}

/// Host that opens a fresh [`SimSession`] per document
#[derive(Debug, Default)]
pub struct SimHost {
    faults: FaultPlan,
    current: Option<String>,
    stats: HostStats,
}

impl SimHost {
    /// Create a host without faults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a host injecting `faults`
    #[must_use]
    pub fn with_faults(faults: FaultPlan) -> Self {
        Self {
            faults,
            ..Self::default()
        }
    }

    /// Open/close bookkeeping
    #[must_use]
    pub fn stats(&self) -> &HostStats {
        &self.stats
    }
}

impl DocumentHost for SimHost {
    type Session = SimSession;

    fn open_document(&mut self, log: &LogId) -> CoreResult<SimSession> {
        let faults = self.faults.for_log(log);
        if faults.fails_open() {
            return Err(CoreError::Session {
                operation: "open".to_string(),
                reason: format!("injected fault opening document for {}", log),
            });
        }
        // A single active document at a time
        if let Some(active) = &self.current {
            return Err(CoreError::Session {
                operation: "open".to_string(),
                reason: format!("document for {} is still open", active),
            });
        }

        self.current = Some(log.name().to_string());
        self.stats.opened.push(log.name().to_string());
        tracing::debug!(log = %log, "Opened simulated document");
        Ok(SimSession::with_faults(faults))
    }

    fn close_document(&mut self, session: SimSession) -> CoreResult<()> {
        let name = self.current.take().ok_or_else(|| CoreError::Session {
            operation: "close".to_string(),
            reason: "no document is open".to_string(),
        })?;

        self.stats.closed.push(name.clone());
        self.stats.closed_history.push(session.history_len());

        if self.faults.for_log(&LogId::from_name(&name)).fails_close() {
            return Err(CoreError::Session {
                operation: "close".to_string(),
                reason: format!("injected fault closing document for {}", name),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::Fault;

    #[test]
    fn test_open_close_bookkeeping() {
        let mut host = SimHost::new();
        let log = LogId::from_name("Hexagon.json");
        let session = host.open_document(&log).unwrap();
        assert_eq!(host.stats().open_count(), 1);

        host.close_document(session).unwrap();
        assert_eq!(host.stats().open_count(), 0);
        assert_eq!(host.stats().close_count("Hexagon.json"), 1);
        assert_eq!(host.stats().closed_history, vec![0]);
    }

    #[test]
    fn test_single_active_document() {
        let mut host = SimHost::new();
        let _first = host.open_document(&LogId::from_name("a.json")).unwrap();
        let err = host.open_document(&LogId::from_name("b.json")).unwrap_err();
        assert_eq!(err.kind(), "SessionError");
    }

    #[test]
    fn test_open_fault() {
        let mut host = SimHost::with_faults(FaultPlan::none().with(Fault::FailOpen {
            log: "a.json".to_string(),
        }));
        assert!(host.open_document(&LogId::from_name("a.json")).is_err());
        assert!(host.stats().opened.is_empty());
        assert!(host.open_document(&LogId::from_name("b.json")).is_ok());
    }

    #[test]
    fn test_close_fault_still_releases() {
        let mut host = SimHost::with_faults(FaultPlan::none().with(Fault::FailClose {
            log: "a.json".to_string(),
        }));
        let session = host.open_document(&LogId::from_name("a.json")).unwrap();
        assert!(host.close_document(session).is_err());
        assert_eq!(host.stats().open_count(), 0);
        assert!(host.open_document(&LogId::from_name("b.json")).is_ok());
    }
}
