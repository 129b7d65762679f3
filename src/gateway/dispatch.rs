//! 故障转移调度：按优先级逐个尝试，首个成功即返回。
//!
//! Sequential failover dispatch. One attempt per provider, no retries, no
//! backoff and no parallel fan-out. The caller's cancellation token and
//! deadline abort the in-flight attempt and end the loop.

use std::time::Instant as StdInstant;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::context::RequestContext;
use crate::error::{AdapterError, AggregateFailure};
use crate::types::{UnifiedRequest, UnifiedResponse};
use crate::{Error, Result};

use super::core::Gateway;

/// Result of walking the ordered candidate list.
#[derive(Debug)]
pub enum DispatchOutcome {
    Success(UnifiedResponse),
    /// Every candidate failed; errors are in call order.
    Failure(Vec<AdapterError>),
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DispatchOutcome::Success(_))
    }

    /// Collapse into a response or [`Error::AllProvidersFailed`].
    pub fn into_result(self) -> Result<UnifiedResponse> {
        match self {
            DispatchOutcome::Success(resp) => Ok(resp),
            DispatchOutcome::Failure(errors) => {
                Err(Error::AllProvidersFailed(AggregateFailure::new(errors)))
            }
        }
    }
}

async fn deadline_reached(deadline: Option<Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(d).await,
        None => std::future::pending::<()>().await,
    }
}

impl Gateway {
    /// Validate, select, then try each candidate in precedence order.
    ///
    /// Returns `Err` only for outcomes not attributable to a provider:
    /// validation, [`Error::NoProvidersAvailable`], cancellation or deadline.
    pub async fn dispatch(
        &self,
        ctx: &RequestContext,
        request: &UnifiedRequest,
    ) -> Result<DispatchOutcome> {
        request.validate()?;

        let candidates = self.candidates();
        if candidates.is_empty() {
            warn!(request_id = ctx.request_id(), "no AI providers available");
            return Err(Error::NoProvidersAvailable);
        }

        let mut failures: Vec<AdapterError> = Vec::with_capacity(candidates.len());

        for (attempt, adapter) in candidates.iter().enumerate() {
            let provider = adapter.identity();
            let started = StdInstant::now();

            let result = tokio::select! {
                biased;
                _ = ctx.cancellation_token().cancelled() => {
                    warn!(
                        request_id = ctx.request_id(),
                        provider = %provider,
                        attempt,
                        "dispatch cancelled"
                    );
                    return Err(Error::Cancelled);
                }
                _ = deadline_reached(ctx.deadline()) => {
                    warn!(
                        request_id = ctx.request_id(),
                        provider = %provider,
                        attempt,
                        "dispatch deadline exceeded"
                    );
                    return Err(Error::DeadlineExceeded);
                }
                r = adapter.generate(ctx, request) => r,
            };

            let duration_ms = started.elapsed().as_millis() as u64;
            let err = match result {
                Ok(resp) if resp.has_choices() => {
                    info!(
                        request_id = ctx.request_id(),
                        provider = %provider,
                        attempt,
                        duration_ms,
                        "dispatch succeeded"
                    );
                    return Ok(DispatchOutcome::Success(resp));
                }
                Ok(_) => AdapterError::empty_choices(provider),
                Err(e) => e,
            };

            warn!(
                request_id = ctx.request_id(),
                provider = %provider,
                attempt,
                duration_ms,
                error = %err,
                "provider attempt failed"
            );
            failures.push(err);
        }

        error!(
            request_id = ctx.request_id(),
            attempts = failures.len(),
            "all AI providers failed"
        );
        Ok(DispatchOutcome::Failure(failures))
    }

    /// [`Gateway::dispatch`] with aggregate failure folded into the error type.
    pub async fn generate_text(
        &self,
        ctx: &RequestContext,
        request: &UnifiedRequest,
    ) -> Result<UnifiedResponse> {
        self.dispatch(ctx, request).await?.into_result()
    }
}
