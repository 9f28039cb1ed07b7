//! Resource existence checks consumed by render behaviors.
//!
//! Some tags only enhance their output when an external resource exists
//! (a smilie image, for instance). The engine owns the contract and the
//! per-call memo; concrete probes live with the tags that need them.

use thiserror::Error;

/// Why a resource check could not give an answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("request timed out")]
    Timeout,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

/// Answers "does this resource exist?".
///
/// Implementations must not panic on network failure; they report it as
/// a [`ProbeError`] and the caller treats it as "absent".
pub trait ResourceProbe: Send + Sync {
    /// `Ok(true)` when the resource exists, `Ok(false)` when it is confirmed
    /// missing.
    fn exists(&self, url: &str) -> Result<bool, ProbeError>;
}

impl<F> ResourceProbe for F
where
    F: Fn(&str) -> Result<bool, ProbeError> + Send + Sync,
{
    fn exists(&self, url: &str) -> Result<bool, ProbeError> {
        self(url)
    }
}

/// The outcome of one check, as remembered for the rest of a render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceStatus {
    Present,
    Absent,
    Failed(ProbeError),
}

impl ResourceStatus {
    pub fn exists(&self) -> bool {
        matches!(self, ResourceStatus::Present)
    }
}

impl From<Result<bool, ProbeError>> for ResourceStatus {
    fn from(result: Result<bool, ProbeError>) -> Self {
        match result {
            Ok(true) => ResourceStatus::Present,
            Ok(false) => ResourceStatus::Absent,
            Err(err) => ResourceStatus::Failed(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_probes() {
        let probe = |url: &str| Ok::<_, ProbeError>(url.ends_with(".gif"));
        assert_eq!(probe.exists("a.gif"), Ok(true));
        assert_eq!(probe.exists("a.png"), Ok(false));
    }

    #[test]
    fn only_present_counts_as_existing() {
        assert!(ResourceStatus::from(Ok(true)).exists());
        assert!(!ResourceStatus::from(Ok(false)).exists());
        assert!(!ResourceStatus::from(Err(ProbeError::Timeout)).exists());
    }
}
