//! Per-call render state: variables, diagnostics, cancellation and probes.

use std::collections::HashMap;
use std::sync::Arc;

use crate::diagnostics::Diagnostic;
use crate::probe::{ResourceProbe, ResourceStatus};
use crate::variables::Variables;

/// A cancellation token checked at every node boundary and before every
/// external call.
///
/// Clones share state, so a caller keeps one clone and hands the other to
/// the [`RenderContext`].
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    inner: tokio_util::sync::CancellationToken,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// Request cancellation. Parses and renders holding this token stop at
    /// their next node boundary.
    pub fn cancel(&self) {
        self.inner.cancel()
    }
}

impl From<tokio_util::sync::CancellationToken> for Cancellation {
    fn from(token: tokio_util::sync::CancellationToken) -> Self {
        Self { inner: token }
    }
}

/// Everything one parse+render call needs beyond the markup itself.
///
/// # Example
///
/// ```
/// use tagmark::RenderContext;
///
/// let ctx = RenderContext::new()
///     .variable("media", "/static/")
///     .variable("user", "ada");
/// assert_eq!(ctx.variables().get("user"), Some("ada"));
/// ```
#[derive(Default)]
pub struct RenderContext {
    variables: Variables,
    diagnostics: Vec<Diagnostic>,
    cancellation: Cancellation,
    probe: Option<Arc<dyn ResourceProbe>>,
    resources: HashMap<String, ResourceStatus>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable for `${name}` placeholders.
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name, value);
        self
    }

    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn ResourceProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn cancellation(&self) -> &Cancellation {
        &self.cancellation
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(
            kind = ?diagnostic.kind,
            span = ?diagnostic.span,
            message = %diagnostic.message,
            "markup diagnostic"
        );
        self.diagnostics.push(diagnostic);
    }

    pub(crate) fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }

    pub(crate) fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Checks a resource, consulting this call's memo first.
    ///
    /// Returns `None` when no probe is configured.
    pub(crate) fn probe_resource(&mut self, url: &str) -> Option<ResourceStatus> {
        if let Some(status) = self.resources.get(url) {
            return Some(status.clone());
        }
        let probe = self.probe.as_ref()?;
        let status = ResourceStatus::from(probe.exists(url));
        if let ResourceStatus::Failed(err) = &status {
            tracing::warn!(url = %url, error = %err, "resource check failed");
        }
        self.resources.insert(url.to_string(), status.clone());
        Some(status)
    }
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("variables", &self.variables)
            .field("diagnostics", &self.diagnostics)
            .field("cancelled", &self.cancellation.is_cancelled())
            .field("has_probe", &self.probe.is_some())
            .field("resources", &self.resources)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn cancellation_clones_share_state() {
        let token = Cancellation::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn probe_results_are_memoized_per_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let probe = move |_url: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ProbeError>(true)
        };
        let mut ctx = RenderContext::new().with_probe(Arc::new(probe));

        assert_eq!(ctx.probe_resource("a"), Some(ResourceStatus::Present));
        assert_eq!(ctx.probe_resource("a"), Some(ResourceStatus::Present));
        assert_eq!(ctx.probe_resource("b"), Some(ResourceStatus::Present));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failures_are_memoized_too() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let probe = move |_url: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<bool, _>(ProbeError::Timeout)
        };
        let mut ctx = RenderContext::new().with_probe(Arc::new(probe));

        assert!(!ctx.probe_resource("a").unwrap().exists());
        assert!(!ctx.probe_resource("a").unwrap().exists());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn no_probe_means_no_status() {
        let mut ctx = RenderContext::new();
        assert_eq!(ctx.probe_resource("a"), None);
    }
}
