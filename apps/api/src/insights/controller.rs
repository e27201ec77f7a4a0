//! Insight Request Controller — owns the lifecycle of one on-demand market analysis.
//!
//! State machine:
//!   Idle ──start──▶ Loading ──ok──▶ Success ──start──▶ Loading …
//!                           └─err─▶ Failed  ──start──▶ Loading …
//!
//! Every `start` (and every `reset`) bumps a generation counter. A provider response is applied
//! only while its generation is still the latest, so an older request that resolves late can
//! never overwrite a newer `Loading`. Completions hold only a weak reference to the state: once
//! the controller is dropped they become no-ops.

use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::insights::models::{AnalysisRequest, AnalysisResult};
use crate::insights::provider::InsightProvider;
use crate::insights::{InsightError, UNKNOWN_ERROR_MESSAGE};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RequestState {
    Idle,
    Loading { topic: String },
    Success { result: AnalysisResult },
    Failed { message: String },
}

/// Controller state plus the generation that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub generation: u64,
    /// Topic of the latest `start`, cleared by `reset`.
    pub topic: Option<String>,
    pub state: RequestState,
    pub updated_at: DateTime<Utc>,
}

impl Snapshot {
    fn initial() -> Self {
        Self {
            generation: 0,
            topic: None,
            state: RequestState::Idle,
            updated_at: Utc::now(),
        }
    }
}

/// Handle to an in-flight analysis. Dropping it detaches the request; it still completes.
pub struct PendingAnalysis {
    pub generation: u64,
    handle: JoinHandle<bool>,
}

impl PendingAnalysis {
    /// Waits for the provider to settle. Returns `true` if the outcome was applied,
    /// `false` if it was discarded as stale or the controller was gone.
    pub async fn settled(self) -> bool {
        self.handle.await.unwrap_or(false)
    }
}

pub struct InsightController {
    provider: Arc<dyn InsightProvider>,
    state: Arc<watch::Sender<Snapshot>>,
}

impl InsightController {
    pub fn new(provider: Arc<dyn InsightProvider>) -> Self {
        let (state, _) = watch::channel(Snapshot::initial());
        Self {
            provider,
            state: Arc::new(state),
        }
    }

    /// Starts a new analysis for `topic`.
    ///
    /// A blank topic is rejected with `InsightError::EmptyTopic` before anything changes.
    /// Otherwise the state is `Loading` when this returns, and the provider call runs on
    /// a spawned task. Must be called from within a tokio runtime.
    pub fn start(&self, topic: &str) -> Result<PendingAnalysis, InsightError> {
        let request = AnalysisRequest::new(topic)?;

        let mut generation = 0;
        self.state.send_modify(|snapshot| {
            snapshot.generation += 1;
            snapshot.topic = Some(request.career_name.clone());
            snapshot.state = RequestState::Loading {
                topic: request.career_name.clone(),
            };
            snapshot.updated_at = Utc::now();
            generation = snapshot.generation;
        });
        info!(
            "Analyzing market for '{}' (generation {generation})",
            request.career_name
        );

        let provider = Arc::clone(&self.provider);
        let state = Arc::downgrade(&self.state);

        let handle = tokio::spawn(async move {
            // Run the provider on its own task so a panic still settles the state.
            let outcome = tokio::spawn(async move { provider.analyze(&request).await }).await;

            let next = match outcome {
                Ok(Ok(result)) => RequestState::Success { result },
                Ok(Err(err)) => {
                    warn!("Market analysis failed (generation {generation}): {err}");
                    RequestState::Failed {
                        message: err.user_message(),
                    }
                }
                Err(join_err) => {
                    warn!("Market analysis task aborted (generation {generation}): {join_err}");
                    RequestState::Failed {
                        message: UNKNOWN_ERROR_MESSAGE.to_string(),
                    }
                }
            };

            apply_if_current(&state, generation, next)
        });

        Ok(PendingAnalysis { generation, handle })
    }

    /// Returns to `Idle`, discarding whatever is in flight.
    /// Used when the upstream recommended career goes away.
    pub fn reset(&self) {
        self.state.send_modify(|snapshot| {
            snapshot.generation += 1;
            snapshot.topic = None;
            snapshot.state = RequestState::Idle;
            snapshot.updated_at = Utc::now();
        });
        debug!("Insight controller reset");
    }

    pub fn current_state(&self) -> RequestState {
        self.state.borrow().state.clone()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.borrow().clone()
    }
}

fn apply_if_current(
    state: &Weak<watch::Sender<Snapshot>>,
    generation: u64,
    next: RequestState,
) -> bool {
    let Some(state) = state.upgrade() else {
        debug!("Controller dropped before generation {generation} settled; ignoring");
        return false;
    };

    state.send_if_modified(|snapshot| {
        if snapshot.generation != generation {
            debug!(
                "Discarding stale response for generation {generation} (latest {})",
                snapshot.generation
            );
            return false;
        }
        snapshot.state = next;
        snapshot.updated_at = Utc::now();
        true
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::sync::oneshot;

    use crate::insights::models::{Citation, DemandLevel, InsightPayload, SalaryRange};

    type Outcome = Result<AnalysisResult, InsightError>;

    /// Provider whose responses are released by the test, one channel per topic.
    #[derive(Default)]
    struct GatedProvider {
        calls: AtomicUsize,
        gates: Mutex<HashMap<String, oneshot::Receiver<Outcome>>>,
    }

    impl GatedProvider {
        fn gate(&self, topic: &str) -> oneshot::Sender<Outcome> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(topic.to_string(), rx);
            tx
        }
    }

    #[async_trait]
    impl InsightProvider for GatedProvider {
        async fn analyze(&self, request: &AnalysisRequest) -> Outcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let rx = self
                .gates
                .lock()
                .unwrap()
                .remove(&request.career_name)
                .expect("no gate registered for topic");
            rx.await
                .unwrap_or_else(|_| Err(InsightError::Provider("gate dropped".to_string())))
        }
    }

    struct PanickingProvider;

    #[async_trait]
    impl InsightProvider for PanickingProvider {
        async fn analyze(&self, _request: &AnalysisRequest) -> Outcome {
            panic!("provider blew up");
        }
    }

    fn result_with(low: f64, average: f64, high: f64) -> AnalysisResult {
        AnalysisResult {
            insight: InsightPayload {
                average_salary_range: SalaryRange { low, average, high },
                demand_level: DemandLevel::High,
                supply_vs_demand: "Demand exceeds supply".to_string(),
                key_skills_in_demand: vec!["Python".to_string(), "Statistics".to_string()],
                top_hiring_locations: vec!["Bengaluru".to_string()],
                growth_outlook: "Strong growth expected".to_string(),
            },
            sources: vec![],
        }
    }

    fn setup() -> (Arc<GatedProvider>, InsightController) {
        let provider = Arc::new(GatedProvider::default());
        let controller = InsightController::new(provider.clone());
        (provider, controller)
    }

    #[tokio::test]
    async fn test_initial_state_is_idle() {
        let (_, controller) = setup();
        assert_eq!(controller.current_state(), RequestState::Idle);
        assert_eq!(controller.snapshot().generation, 0);
    }

    #[tokio::test]
    async fn test_start_enters_loading_before_provider_resolves() {
        let (provider, controller) = setup();
        let _tx = provider.gate("Data Scientist");

        controller.start("Data Scientist").unwrap();

        assert_eq!(
            controller.current_state(),
            RequestState::Loading {
                topic: "Data Scientist".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_empty_topic_leaves_state_unchanged_and_skips_provider() {
        let (provider, controller) = setup();

        assert!(matches!(
            controller.start(""),
            Err(InsightError::EmptyTopic)
        ));
        assert!(matches!(
            controller.start("  "),
            Err(InsightError::EmptyTopic)
        ));
        tokio::task::yield_now().await;

        assert_eq!(controller.current_state(), RequestState::Idle);
        assert_eq!(controller.snapshot().generation, 0);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_data_scientist_success_scenario() {
        let (provider, controller) = setup();
        let tx = provider.gate("Data Scientist");

        let pending = controller.start("Data Scientist").unwrap();
        let expected = result_with(600_000.0, 900_000.0, 1_500_000.0);
        tx.send(Ok(expected.clone())).unwrap();

        assert!(pending.settled().await);
        match controller.current_state() {
            RequestState::Success { result } => {
                assert_eq!(result, expected);
                assert!(result.sources.is_empty());
            }
            other => panic!("expected Success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failure_reports_message_and_allows_restart() {
        let (provider, controller) = setup();
        let tx = provider.gate("Actuary");

        let pending = controller.start("Actuary").unwrap();
        tx.send(Err(InsightError::Provider("quota exceeded".to_string())))
            .unwrap();
        assert!(pending.settled().await);

        assert_eq!(
            controller.current_state(),
            RequestState::Failed {
                message: "quota exceeded".to_string()
            }
        );

        let _retry = provider.gate("Actuary");
        controller.start("Actuary").unwrap();
        assert!(matches!(
            controller.current_state(),
            RequestState::Loading { .. }
        ));
    }

    #[tokio::test]
    async fn test_failure_without_description_uses_fallback() {
        let (provider, controller) = setup();
        let tx = provider.gate("Pilot");

        let pending = controller.start("Pilot").unwrap();
        tx.send(Err(InsightError::Provider(String::new()))).unwrap();
        pending.settled().await;

        assert_eq!(
            controller.current_state(),
            RequestState::Failed {
                message: UNKNOWN_ERROR_MESSAGE.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let (provider, controller) = setup();
        let tx_old = provider.gate("Architect");
        let tx_new = provider.gate("Data Scientist");

        let old = controller.start("Architect").unwrap();
        let new = controller.start("Data Scientist").unwrap();
        assert!(new.generation > old.generation);

        let newer = result_with(600_000.0, 900_000.0, 1_500_000.0);
        tx_new.send(Ok(newer.clone())).unwrap();
        assert!(new.settled().await);

        tx_old
            .send(Ok(result_with(300_000.0, 400_000.0, 500_000.0)))
            .unwrap();
        assert!(!old.settled().await);

        assert_eq!(
            controller.current_state(),
            RequestState::Success { result: newer }
        );
    }

    #[tokio::test]
    async fn test_stale_failure_does_not_clobber_newer_loading() {
        let (provider, controller) = setup();
        let tx_old = provider.gate("Architect");
        let _tx_new = provider.gate("Designer");

        let old = controller.start("Architect").unwrap();
        controller.start("Designer").unwrap();

        tx_old
            .send(Err(InsightError::Provider("timeout".to_string())))
            .unwrap();
        assert!(!old.settled().await);

        assert_eq!(
            controller.current_state(),
            RequestState::Loading {
                topic: "Designer".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_reset_returns_to_idle_and_discards_in_flight() {
        let (provider, controller) = setup();
        let tx = provider.gate("Chef");

        let pending = controller.start("Chef").unwrap();
        controller.reset();
        assert_eq!(controller.current_state(), RequestState::Idle);
        assert!(controller.snapshot().topic.is_none());

        tx.send(Ok(result_with(1.0, 2.0, 3.0))).unwrap();
        assert!(!pending.settled().await);
        assert_eq!(controller.current_state(), RequestState::Idle);
    }

    #[tokio::test]
    async fn test_dropping_controller_makes_completion_a_noop() {
        let (provider, controller) = setup();
        let tx = provider.gate("Nurse");

        let pending = controller.start("Nurse").unwrap();
        drop(controller);

        tx.send(Ok(result_with(1.0, 2.0, 3.0))).unwrap();
        assert!(!pending.settled().await);
    }

    #[tokio::test]
    async fn test_provider_panic_settles_as_failed() {
        let controller = InsightController::new(Arc::new(PanickingProvider));

        let pending = controller.start("Astronaut").unwrap();
        assert!(pending.settled().await);

        assert_eq!(
            controller.current_state(),
            RequestState::Failed {
                message: UNKNOWN_ERROR_MESSAGE.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_current_state_is_idempotent() {
        let (provider, controller) = setup();
        let tx = provider.gate("Lawyer");
        let pending = controller.start("Lawyer").unwrap();
        tx.send(Ok(AnalysisResult {
            sources: vec![Citation {
                uri: "https://example.com".to_string(),
                title: "Example".to_string(),
            }],
            ..result_with(1.0, 2.0, 3.0)
        }))
        .unwrap();
        pending.settled().await;

        let first = controller.current_state();
        for _ in 0..5 {
            assert_eq!(controller.current_state(), first);
        }
    }
}
