//! Query execution with endpoint failover and bounded retries

use std::sync::Arc;
use std::time::Duration;

use alongtrack_core::config::OverpassSettings;
use alongtrack_core::error::{AlongTrackError, Result};
use alongtrack_core::models::Candidate;
use alongtrack_core::ports::QueryTransport;

use crate::response::parse_response;

/// Endpoints and retry budget for one fetcher
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Endpoints in the order they are tried within each attempt
    pub endpoints: Vec<String>,
    /// Number of full passes over the endpoint list
    pub attempts: u32,
    /// Base backoff; after attempt `n` fails everywhere the fetcher sleeps `n x backoff`
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn from_settings(settings: &OverpassSettings) -> Self {
        Self {
            endpoints: settings.endpoints.clone(),
            attempts: settings.retries,
            backoff: settings.backoff,
        }
    }

    fn backoff_after(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchState {
    /// Post to `endpoint` during `attempt` (1-based)
    Request { attempt: u32, endpoint: usize },
    /// Every endpoint failed during `attempt`
    Backoff { attempt: u32 },
}

/// Posts queries through a [`QueryTransport`], failing over between
/// endpoints and retrying with linear backoff.
///
/// A response only counts as a success when it parses as Overpass JSON.
#[derive(Clone)]
pub struct RetryingFetcher {
    transport: Arc<dyn QueryTransport>,
    policy: RetryPolicy,
}

impl RetryingFetcher {
    pub fn new(transport: Arc<dyn QueryTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch candidates for `query`, degrading to an empty result when every
    /// endpoint and attempt has failed.
    pub async fn fetch(&self, query: &str) -> Vec<Candidate> {
        match self.try_fetch(query).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::error!(error = %e, "Overpass query permanently failed, continuing without results");
                Vec::new()
            }
        }
    }

    /// Fetch candidates for `query`, returning `TransportFailure` once the
    /// retry budget is exhausted.
    pub async fn try_fetch(&self, query: &str) -> Result<Vec<Candidate>> {
        let endpoints = &self.policy.endpoints;
        let attempts = self.policy.attempts;
        if endpoints.is_empty() || attempts == 0 {
            return Err(AlongTrackError::TransportFailure {
                attempts: 0,
                last_error: "no endpoints configured".to_string(),
            });
        }

        let mut last_error = String::new();
        let mut state = FetchState::Request {
            attempt: 1,
            endpoint: 0,
        };

        loop {
            state = match state {
                FetchState::Request { attempt, endpoint } => {
                    let url = &endpoints[endpoint];
                    match self.request(url, query).await {
                        Ok(candidates) => {
                            tracing::info!(
                                endpoint = %url,
                                attempt,
                                candidates = candidates.len(),
                                "Overpass query succeeded"
                            );
                            return Ok(candidates);
                        }
                        Err(e) => {
                            tracing::debug!(endpoint = %url, attempt, error = %e, "Overpass endpoint failed");
                            last_error = e.to_string();
                            if endpoint + 1 < endpoints.len() {
                                FetchState::Request {
                                    attempt,
                                    endpoint: endpoint + 1,
                                }
                            } else if attempt < attempts {
                                FetchState::Backoff { attempt }
                            } else {
                                break;
                            }
                        }
                    }
                }
                FetchState::Backoff { attempt } => {
                    let wait = self.policy.backoff_after(attempt);
                    tracing::warn!(
                        "Overpass error, retrying in {:?} (attempt {}/{})",
                        wait,
                        attempt,
                        attempts
                    );
                    tokio::time::sleep(wait).await;
                    FetchState::Request {
                        attempt: attempt + 1,
                        endpoint: 0,
                    }
                }
            };
        }

        Err(AlongTrackError::TransportFailure {
            attempts,
            last_error,
        })
    }

    async fn request(&self, endpoint: &str, query: &str) -> Result<Vec<Candidate>> {
        let body = self.transport.post(endpoint, query).await?;
        parse_response(endpoint, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const OK_BODY: &str =
        r#"{"elements": [{"type": "node", "id": 1, "lat": 1.0, "lon": 2.0, "tags": {}}]}"#;

    /// Replays scripted outcomes per endpoint and records every call
    struct ScriptedTransport {
        script: Mutex<Vec<(String, Vec<std::result::Result<String, String>>)>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<(&str, Vec<std::result::Result<&str, &str>>)>) -> Self {
            let script = script
                .into_iter()
                .map(|(endpoint, outcomes)| {
                    let outcomes = outcomes
                        .into_iter()
                        .rev()
                        .map(|o| o.map(str::to_string).map_err(str::to_string))
                        .collect();
                    (endpoint.to_string(), outcomes)
                })
                .collect();
            Self {
                script: Mutex::new(script),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QueryTransport for ScriptedTransport {
        async fn post(&self, endpoint: &str, _query: &str) -> Result<String> {
            self.calls.lock().unwrap().push(endpoint.to_string());
            let mut script = self.script.lock().unwrap();
            let outcome = script
                .iter_mut()
                .find(|(e, _)| e == endpoint)
                .and_then(|(_, outcomes)| outcomes.pop())
                .unwrap_or_else(|| Err("connection refused".to_string()));
            outcome.map_err(|e| AlongTrackError::TransportFailure {
                attempts: 1,
                last_error: e,
            })
        }
    }

    fn fetcher(transport: Arc<ScriptedTransport>, attempts: u32) -> RetryingFetcher {
        RetryingFetcher::new(
            transport,
            RetryPolicy {
                endpoints: vec!["http://e1".to_string(), "http://e2".to_string()],
                attempts,
                backoff: Duration::ZERO,
            },
        )
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let transport = Arc::new(ScriptedTransport::new(vec![("http://e1", vec![Ok(OK_BODY)])]));
        let candidates = fetcher(transport.clone(), 5).fetch("q").await;

        assert_eq!(candidates.len(), 1);
        assert_eq!(transport.calls(), vec!["http://e1"]);
    }

    #[tokio::test]
    async fn test_failover_to_second_endpoint_on_second_attempt() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            ("http://e1", vec![]),
            ("http://e2", vec![Err("503"), Ok(OK_BODY)]),
        ]));
        let candidates = fetcher(transport.clone(), 5).try_fetch("q").await.unwrap();

        assert_eq!(candidates[0].id, "N1");
        assert_eq!(
            transport.calls(),
            vec!["http://e1", "http://e2", "http://e1", "http://e2"]
        );
    }

    #[tokio::test]
    async fn test_malformed_payload_counts_as_failure() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            ("http://e1", vec![Ok("<html>busy</html>")]),
            ("http://e2", vec![Ok(OK_BODY)]),
        ]));
        let candidates = fetcher(transport.clone(), 1).fetch("q").await;

        assert_eq!(candidates.len(), 1);
        assert_eq!(transport.calls(), vec!["http://e1", "http://e2"]);
    }

    #[tokio::test]
    async fn test_exhaustion_uses_full_budget_and_degrades() {
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let fetcher = fetcher(transport.clone(), 3);

        let err = fetcher.try_fetch("q").await.unwrap_err();
        assert!(matches!(err, AlongTrackError::TransportFailure { attempts: 3, .. }));
        assert_eq!(transport.calls().len(), 6);

        assert!(fetcher.fetch("q").await.is_empty());
        assert_eq!(transport.calls().len(), 12);
    }

    #[tokio::test]
    async fn test_no_endpoints() {
        let fetcher = RetryingFetcher::new(
            Arc::new(ScriptedTransport::new(vec![])),
            RetryPolicy {
                endpoints: vec![],
                attempts: 3,
                backoff: Duration::ZERO,
            },
        );
        assert!(fetcher.try_fetch("q").await.is_err());
    }

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy {
            endpoints: vec![],
            attempts: 5,
            backoff: Duration::from_secs(2),
        };
        assert_eq!(policy.backoff_after(1), Duration::from_secs(2));
        assert_eq!(policy.backoff_after(3), Duration::from_secs(6));
    }
}
