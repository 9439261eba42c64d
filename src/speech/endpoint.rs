// Speech endpoint discovery
//
// The client keeps an ordered list of candidate base URLs and starts out
// bound to the first one without probing. Only a connectivity failure runs
// discovery: the remaining candidates are probed in order and the first that
// answers at all is adopted; an HTTP error status still proves the host is
// reachable. Each candidate is probed at most once per discovery round.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::TranscriptionError;

/// Lifecycle of the working endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointState {
    /// Nothing bound yet
    Initialized,
    /// A discovery round is running
    Probing,
    /// Requests go to `candidates[index]`
    Bound(usize),
}

/// Reachability check for a base URL
#[async_trait::async_trait]
pub trait EndpointProbe: Send + Sync {
    async fn is_reachable(&self, base_url: &str) -> bool;
}

/// Probes with a plain GET; any HTTP response counts as reachable
pub struct HttpProbe {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait::async_trait]
impl EndpointProbe for HttpProbe {
    async fn is_reachable(&self, base_url: &str) -> bool {
        match self.client.get(base_url).timeout(self.timeout).send().await {
            Ok(response) => {
                debug!("Probe {} answered {}", base_url, response.status());
                true
            }
            Err(e) => {
                debug!("Probe {} failed: {}", base_url, e);
                false
            }
        }
    }
}

/// Ordered candidate endpoints plus the currently bound one
#[derive(Debug, Clone)]
pub struct EndpointPool {
    candidates: Vec<String>,
    state: EndpointState,
}

impl EndpointPool {
    pub fn new(candidates: Vec<String>) -> Self {
        let candidates = candidates
            .into_iter()
            .map(|c| c.trim_end_matches('/').to_string())
            .filter(|c| !c.is_empty())
            .collect();

        Self {
            candidates,
            state: EndpointState::Initialized,
        }
    }

    /// Region endpoint first, then any alternates
    pub fn for_region(region: &str, alternates: &[String]) -> Self {
        let mut candidates = vec![region_endpoint(region)];
        candidates.extend(alternates.iter().cloned());
        Self::new(candidates)
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn state(&self) -> EndpointState {
        self.state
    }

    pub fn current(&self) -> Option<&str> {
        match self.state {
            EndpointState::Bound(index) => self.candidates.get(index).map(String::as_str),
            _ => None,
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            EndpointState::Bound(index) => Some(index),
            _ => None,
        }
    }

    /// Return the bound endpoint, binding the first candidate if nothing is bound
    pub fn ensure_bound(&mut self) -> Result<String, TranscriptionError> {
        if let Some(current) = self.current() {
            return Ok(current.to_string());
        }

        let first = self
            .candidates
            .first()
            .cloned()
            .ok_or(TranscriptionError::NoReachableEndpoint { tried: 0 })?;
        info!("Speech endpoint bound to {}", first);
        self.state = EndpointState::Bound(0);
        Ok(first)
    }

    /// Probe candidates in order (skipping `failed`) and bind to the first reachable one
    ///
    /// The failed endpoint counts towards `tried` in the resulting error.
    pub async fn discover(
        &mut self,
        probe: &dyn EndpointProbe,
        failed: Option<usize>,
    ) -> Result<String, TranscriptionError> {
        let previous = self.state;
        self.state = EndpointState::Probing;
        let mut tried = usize::from(failed.is_some());

        for (index, candidate) in self.candidates.iter().enumerate() {
            if Some(index) == failed {
                continue;
            }
            tried += 1;
            if probe.is_reachable(candidate).await {
                if previous != EndpointState::Bound(index) {
                    info!("Speech endpoint bound to {}", candidate);
                }
                self.state = EndpointState::Bound(index);
                return Ok(candidate.clone());
            }
            warn!("Speech endpoint {} unreachable", candidate);
        }

        self.state = EndpointState::Initialized;
        Err(TranscriptionError::NoReachableEndpoint { tried })
    }
}

/// Default recognition host for an Azure region
pub fn region_endpoint(region: &str) -> String {
    format!("https://{}.stt.speech.microsoft.com", region)
}
