//! Resource existence checks over HTTP.
//!
//! [`HttpProbe`] answers "does this URL exist" with a GET request. Wrap it
//! in [`CachedProbe`] to reuse definitive answers across render calls;
//! failed checks are never cached so a flaky network heals on its own.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tagmark::{ProbeError, ResourceProbe};
use ureq::Agent;

/// Checks resources with a blocking HTTP GET.
///
/// Any 2xx answer means present and any 4xx means absent. Everything else,
/// including timeouts and connection failures, is a failed check.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    agent: Agent,
}

impl HttpProbe {
    /// Creates a probe whose every request gives up after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: create_agent(timeout),
        }
    }
}

/// Create HTTP agent with the specified timeout.
///
/// Status codes are inspected by the probe, not turned into errors.
fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

impl ResourceProbe for HttpProbe {
    fn exists(&self, url: &str) -> Result<bool, ProbeError> {
        let response = self.agent.get(url).call().map_err(|e| match e {
            ureq::Error::Timeout(_) => ProbeError::Timeout,
            other => ProbeError::Transport(other.to_string()),
        })?;

        let status = response.status().as_u16();
        tracing::trace!(url = %url, status, "resource probed");
        match status {
            200..=299 => Ok(true),
            400..=499 => Ok(false),
            _ => Err(ProbeError::InvalidResponse(format!("HTTP {status}"))),
        }
    }
}

/// Answers kept by [`CachedProbe::new`].
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Remembers definitive answers of an inner probe for a fixed time.
///
/// At most `capacity` answers are kept. Inserting into a full cache first
/// drops expired answers, then the oldest ones.
#[derive(Debug)]
pub struct CachedProbe<P> {
    inner: P,
    ttl: Duration,
    capacity: usize,
    answers: Mutex<HashMap<String, (bool, Instant)>>,
}

impl<P: ResourceProbe> CachedProbe<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self::with_capacity(inner, ttl, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(inner: P, ttl: Duration, capacity: usize) -> Self {
        Self {
            inner,
            ttl,
            capacity,
            answers: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Number of answers currently held, expired or not.
    pub fn len(&self) -> usize {
        self.answers.lock().map_or(0, |answers| answers.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets every cached answer.
    pub fn clear(&self) {
        if let Ok(mut answers) = self.answers.lock() {
            answers.clear();
        }
    }

    fn cached(&self, url: &str) -> Option<bool> {
        let answers = self.answers.lock().ok()?;
        let (exists, stored) = answers.get(url)?;
        (stored.elapsed() < self.ttl).then_some(*exists)
    }

    fn store(&self, url: &str, exists: bool) {
        if self.capacity == 0 {
            return;
        }
        let Ok(mut answers) = self.answers.lock() else {
            return;
        };
        if answers.len() >= self.capacity && !answers.contains_key(url) {
            let ttl = self.ttl;
            answers.retain(|_, (_, stored)| stored.elapsed() < ttl);
            let excess = (answers.len() + 1).saturating_sub(self.capacity);
            if excess > 0 {
                let mut by_age: Vec<(Instant, String)> = answers
                    .iter()
                    .map(|(url, (_, stored))| (*stored, url.clone()))
                    .collect();
                by_age.sort_unstable();
                for (_, url) in by_age.into_iter().take(excess) {
                    answers.remove(&url);
                }
            }
            tracing::trace!(kept = answers.len(), "probe cache pruned");
        }
        answers.insert(url.to_string(), (exists, Instant::now()));
    }
}

impl<P: ResourceProbe> ResourceProbe for CachedProbe<P> {
    fn exists(&self, url: &str) -> Result<bool, ProbeError> {
        if let Some(exists) = self.cached(url) {
            return Ok(exists);
        }
        let exists = self.inner.exists(url)?;
        self.store(url, exists);
        Ok(exists)
    }
}
