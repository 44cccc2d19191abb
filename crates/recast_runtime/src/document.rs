//! Scoped ownership of the per-log document.

use recast_core::{CoreError, CoreResult, LogId};
use recast_replay::DocumentHost;

/// An open document that is closed on every exit path
///
/// Dropping the guard closes the document; [`DocumentGuard::close`] does the
/// same but reports the error.
pub struct DocumentGuard<'h, H: DocumentHost> {
    host: &'h mut H,
    session: Option<H::Session>,
    log: LogId,
}

impl<'h, H: DocumentHost> DocumentGuard<'h, H> {
    /// Open the document for `log`
    ///
    /// # Errors
    ///
    /// Returns error if the host cannot open a document; nothing needs closing
    pub fn open(host: &'h mut H, log: &LogId) -> CoreResult<Self> {
        let session = host.open_document(log)?;
        Ok(Self {
            host,
            session: Some(session),
            log: log.clone(),
        })
    }

    /// The open session
    ///
    /// # Errors
    ///
    /// Returns error if the document was already released
    pub fn session_mut(&mut self) -> CoreResult<&mut H::Session> {
        self.session.as_mut().ok_or_else(|| CoreError::Session {
            operation: "access".to_string(),
            reason: format!("document for {} is closed", self.log),
        })
    }

    /// Close the document now
    ///
    /// # Errors
    ///
    /// Returns error if the host refuses to close it
    pub fn close(mut self) -> CoreResult<()> {
        match self.session.take() {
            Some(session) => self.host.close_document(session),
            None => Ok(()),
        }
    }
}

impl<H: DocumentHost> Drop for DocumentGuard<'_, H> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            if let Err(err) = self.host.close_document(session) {
                tracing::warn!(log = %self.log, error = %err, "Failed to close document");
            }
        }
    }
}
