use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::{
    sync::{broadcast, watch},
    time::timeout,
};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{
        aggregate, CatalogItem, FailureReason, InvocationToken, PipelineSnapshot, PipelineState,
        RecommendationOutcome, UserPreferences,
    },
    services::{
        prompt::build_prompt,
        providers::{CatalogProvider, CompletionProvider},
        related::{RelatedItems, RelatedStrategy},
    },
};

const TRANSITION_BUFFER: usize = 64;

/// Tunables for a pipeline
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub related_strategy: RelatedStrategy,
    pub related_limit: usize,
    /// Upper bound for each network stage
    pub stage_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            related_strategy: RelatedStrategy::Recommendations,
            related_limit: 10,
            stage_timeout: Duration::from_secs(15),
        }
    }
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            related_strategy: config.related_strategy,
            related_limit: config.related_limit,
            stage_timeout: config.stage_timeout(),
        }
    }
}

/// Preferences → prompt → completion → title search → related items
///
/// Stages run strictly in sequence. Every `submit` gets a fresh [`InvocationToken`]; a run
/// whose token is no longer the latest stops at its next stage boundary and publishes
/// nothing, so a slow earlier run can never overwrite a newer one.
pub struct RecommendationPipeline {
    completion: Arc<dyn CompletionProvider>,
    catalog: Arc<dyn CatalogProvider>,
    related: RelatedItems,
    stage_timeout: Duration,
    epoch: AtomicU64,
    state_tx: watch::Sender<PipelineSnapshot>,
    transitions_tx: broadcast::Sender<PipelineSnapshot>,
}

impl RecommendationPipeline {
    pub fn new(
        completion: Arc<dyn CompletionProvider>,
        catalog: Arc<dyn CatalogProvider>,
        settings: PipelineSettings,
    ) -> Self {
        let (state_tx, _) = watch::channel(PipelineSnapshot::default());
        let (transitions_tx, _) = broadcast::channel(TRANSITION_BUFFER);
        let related = RelatedItems::new(
            catalog.clone(),
            settings.related_strategy,
            settings.related_limit,
        );

        Self {
            completion,
            catalog,
            related,
            stage_timeout: settings.stage_timeout,
            epoch: AtomicU64::new(0),
            state_tx,
            transitions_tx,
        }
    }

    /// Latest state of the latest run
    pub fn snapshot(&self) -> PipelineSnapshot {
        self.state_tx.borrow().clone()
    }

    /// Watches the latest state; intermediate states may be skipped by slow readers
    pub fn subscribe(&self) -> watch::Receiver<PipelineSnapshot> {
        self.state_tx.subscribe()
    }

    /// Every state transition of current runs, in order
    pub fn transitions(&self) -> broadcast::Receiver<PipelineSnapshot> {
        self.transitions_tx.subscribe()
    }

    pub fn current_token(&self) -> InvocationToken {
        InvocationToken(self.epoch.load(Ordering::SeqCst))
    }

    /// Runs the whole chain for `prefs`
    ///
    /// Stage failures come back as an outcome carrying a [`FailureReason`]. The only error
    /// is [`AppError::Superseded`], returned when a newer submission started before this
    /// one finished.
    pub async fn submit(&self, prefs: UserPreferences) -> AppResult<RecommendationOutcome> {
        let token = InvocationToken(self.epoch.fetch_add(1, Ordering::SeqCst) + 1);
        tracing::info!(token = %token, "Recommendation submitted");

        self.publish(token, PipelineState::BuildingPrompt)?;
        let prompt = build_prompt(&prefs);

        self.publish(token, PipelineState::AwaitingCompletion)?;
        let title = match self.complete(&prompt).await {
            Ok(title) => title,
            Err(reason) => return self.fail(token, reason),
        };

        self.publish(
            token,
            PipelineState::AwaitingPrimarySearch {
                title: title.clone(),
            },
        )?;
        let primary = match self.search(&title).await {
            Ok(Some(primary)) => primary,
            Ok(None) => {
                tracing::info!(token = %token, title = %title, "No catalog match for recommended title");
                return self.finish(token, aggregate(None, Vec::new(), None).with_recommended_title(title));
            }
            Err(reason) => return self.fail(token, reason),
        };

        self.publish(
            token,
            PipelineState::AwaitingRelated {
                primary_id: primary.id,
            },
        )?;
        let related = self.fetch_related(&primary).await;

        self.finish(
            token,
            aggregate(Some(primary), related, None).with_recommended_title(title),
        )
    }

    /// Runs [`submit`](Self::submit) on its own task and waits for it
    ///
    /// The run owns its task, so it still reaches `Done` or `Errored` when the caller
    /// stops waiting (a dropped HTTP request, for one).
    pub async fn submit_detached(
        self: &Arc<Self>,
        prefs: UserPreferences,
    ) -> AppResult<RecommendationOutcome> {
        let pipeline = Arc::clone(self);
        tokio::spawn(async move { pipeline.submit(prefs).await })
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Recommendation task did not complete");
                AppError::Internal("Recommendation task did not complete".to_string())
            })?
    }

    async fn complete(&self, prompt: &str) -> Result<String, FailureReason> {
        let result = match timeout(self.stage_timeout, self.completion.complete(prompt)).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, provider = self.completion.name(), "Completion stage failed");
                return Err(FailureReason::CompletionFailed);
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.stage_timeout.as_millis() as u64,
                    provider = self.completion.name(),
                    "Completion stage timed out"
                );
                return Err(FailureReason::CompletionFailed);
            }
        };

        let title = result.recommended_title();
        if title.is_empty() {
            tracing::warn!(provider = self.completion.name(), "Completion returned an empty title");
            return Err(FailureReason::CompletionFailed);
        }

        Ok(title.to_string())
    }

    async fn search(&self, title: &str) -> Result<Option<CatalogItem>, FailureReason> {
        match timeout(self.stage_timeout, self.catalog.search_by_title(title)).await {
            Ok(Ok(results)) => Ok(results.into_iter().next()),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, provider = self.catalog.name(), "Title search stage failed");
                Err(FailureReason::CatalogSearchFailed)
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.stage_timeout.as_millis() as u64,
                    provider = self.catalog.name(),
                    "Title search stage timed out"
                );
                Err(FailureReason::CatalogSearchFailed)
            }
        }
    }

    async fn fetch_related(&self, primary: &CatalogItem) -> Vec<CatalogItem> {
        timeout(self.stage_timeout, self.related.fetch(primary))
            .await
            .unwrap_or_else(|_| {
                tracing::warn!(movie_id = primary.id, "Related items stage timed out");
                Vec::new()
            })
    }

    fn fail(&self, token: InvocationToken, reason: FailureReason) -> AppResult<RecommendationOutcome> {
        self.publish(token, PipelineState::Errored { reason })?;
        Ok(aggregate(None, Vec::new(), Some(reason)))
    }

    fn finish(
        &self,
        token: InvocationToken,
        outcome: RecommendationOutcome,
    ) -> AppResult<RecommendationOutcome> {
        self.publish(
            token,
            PipelineState::Done {
                outcome: outcome.clone(),
            },
        )?;

        tracing::info!(
            token = %token,
            primary = outcome.primary.as_ref().map(|p| p.id),
            related = outcome.related.len(),
            "Recommendation completed"
        );

        Ok(outcome)
    }

    /// Publishes `state` for `token`, unless a newer run has started
    ///
    /// The token check happens under the watch lock, so once a newer submission has
    /// published anything, no older run can publish again. `Done` and `Errored` are final
    /// for their token.
    fn publish(&self, token: InvocationToken, state: PipelineState) -> AppResult<()> {
        let name = state.name();
        let published = self.state_tx.send_if_modified(|snapshot| {
            if self.epoch.load(Ordering::SeqCst) != token.0 {
                return false;
            }
            if snapshot.token == token && snapshot.state.is_terminal() {
                return false;
            }
            *snapshot = PipelineSnapshot { token, state };
            // No subscribers is fine
            let _ = self.transitions_tx.send(snapshot.clone());
            true
        });

        if !published {
            tracing::debug!(
                token = %token,
                current = %self.current_token(),
                state = name,
                "Discarding state of a superseded or finished submission"
            );
            return Err(AppError::Superseded);
        }

        tracing::debug!(token = %token, state = name, "Pipeline state changed");
        Ok(())
    }
}
