//! Planner facade.
//!
//! Owns the shared result cache, execution ledger, and collaborator seams,
//! and runs each call through the same sequence:
//!
//! 1. Permission gate, then the fire-and-forget compliance hook
//! 2. Validation, with the batch-size degrade path
//! 3. Routing decision
//! 4. Cache lookup under a per-fingerprint single-flight lock
//! 5. On a miss: score, analyze, phase, metrics
//! 6. Cache store and ledger append
//!
//! Per-call working state (task states, conflicts, phases under
//! construction) lives on this call's stack and is never stored on the
//! planner, so concurrent calls cannot corrupt each other. The cache and
//! ledger are the only cross-call state and carry their own locking.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cache::{ResultCache, fingerprint};
use crate::cancel::CancelToken;
use crate::collab::{
    ACTION_PLAN, AllowAllSecurity, ComplianceManager, DefaultValidator, ErrorContext, ErrorHandler,
    LocalRouter, NoRecovery, NoopCompliance, ProcessingActivity, RegionRouter, RouteRequest,
    SecurityManager, ValidationReport, Validator,
};
use crate::config::PlannerConfig;
use crate::domain::{Constraints, Plan, PlanResponse, Principal, Task, now_ms, principal_key};
use crate::error::{PlanrError, Result};
use crate::ledger::{ExecutionLedger, LedgerRecord};
use crate::pipeline::conflict::ConflictAnalyzer;
use crate::pipeline::{metrics, phases, scoring};

/// The phased execution planner.
///
/// Cheap to share behind `Arc`; every method takes `&self`.
pub struct Planner {
    config: PlannerConfig,
    analyzer: ConflictAnalyzer,
    cache: ResultCache,
    ledger: ExecutionLedger,
    validator: Arc<dyn Validator>,
    security: Arc<dyn SecurityManager>,
    compliance: Arc<dyn ComplianceManager>,
    router: Arc<dyn RegionRouter>,
    error_handler: Arc<dyn ErrorHandler>,
}

impl Planner {
    /// Create a planner with default configuration and standalone
    /// collaborator defaults.
    pub fn new() -> Self {
        Self::with_config(PlannerConfig::default())
    }

    /// Create a planner with custom configuration.
    pub fn with_config(config: PlannerConfig) -> Self {
        let validator = DefaultValidator::new().with_scoring(config.scoring.clone());
        Self {
            analyzer: ConflictAnalyzer::new(config.conflict.threshold),
            cache: ResultCache::new(config.cache.ttl_ms),
            ledger: ExecutionLedger::new(config.ledger.capacity),
            validator: Arc::new(validator),
            security: Arc::new(AllowAllSecurity),
            compliance: Arc::new(NoopCompliance),
            router: Arc::new(LocalRouter::new()),
            error_handler: Arc::new(NoRecovery),
            config,
        }
    }

    /// Replace the validator collaborator.
    pub fn with_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validator = validator;
        self
    }

    /// Replace the security collaborator.
    pub fn with_security(mut self, security: Arc<dyn SecurityManager>) -> Self {
        self.security = security;
        self
    }

    /// Replace the compliance collaborator.
    pub fn with_compliance(mut self, compliance: Arc<dyn ComplianceManager>) -> Self {
        self.compliance = compliance;
        self
    }

    /// Replace the router collaborator.
    pub fn with_router(mut self, router: Arc<dyn RegionRouter>) -> Self {
        self.router = router;
        self
    }

    /// Replace the error-handler collaborator.
    pub fn with_error_handler(mut self, error_handler: Arc<dyn ErrorHandler>) -> Self {
        self.error_handler = error_handler;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// The shared execution ledger.
    pub fn ledger(&self) -> &ExecutionLedger {
        &self.ledger
    }

    /// The shared result cache.
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Cumulative pairwise-analysis count. Cache hits do not increase it.
    pub fn analysis_runs(&self) -> u64 {
        self.analyzer.analysis_runs()
    }

    /// Plan a batch of tasks.
    pub async fn plan(
        &self,
        tasks: Vec<Task>,
        constraints: Constraints,
        principal: Option<Principal>,
    ) -> Result<PlanResponse> {
        self.plan_with_token(tasks, constraints, principal, CancelToken::new())
            .await
    }

    /// Plan with a per-call deadline. The call fails cleanly with
    /// `Cancelled` once the timeout elapses; no partial plan is returned.
    pub async fn plan_with_deadline(
        &self,
        tasks: Vec<Task>,
        constraints: Constraints,
        principal: Option<Principal>,
        timeout: Duration,
    ) -> Result<PlanResponse> {
        self.plan_with_token(tasks, constraints, principal, CancelToken::with_timeout(timeout))
            .await
    }

    /// Plan with an explicit cancellation token.
    ///
    /// On failure the error handler gets exactly one recovery attempt; if
    /// it fails too, the original error propagates unchanged.
    pub async fn plan_with_token(
        &self,
        tasks: Vec<Task>,
        constraints: Constraints,
        principal: Option<Principal>,
        token: CancelToken,
    ) -> Result<PlanResponse> {
        let started = Instant::now();
        match self
            .plan_inner(&tasks, &constraints, principal.as_ref(), &token, started)
            .await
        {
            Ok(response) => Ok(response),
            Err(original) => {
                let context = ErrorContext {
                    principal: principal_key(principal.as_ref()),
                    task_count: tasks.len(),
                };
                match self.error_handler.handle(&original, &context).await {
                    Ok(fallback) => {
                        tracing::warn!(error = %original, "recovered via error handler");
                        Ok(fallback)
                    }
                    Err(_) => Err(original),
                }
            }
        }
    }

    async fn plan_inner(
        &self,
        tasks: &[Task],
        constraints: &Constraints,
        principal: Option<&Principal>,
        token: &CancelToken,
        started: Instant,
    ) -> Result<PlanResponse> {
        token.checkpoint()?;

        // Permission gate before any computation.
        let allowed = self.security.check_permission(principal, ACTION_PLAN).await?;
        if !allowed {
            return Err(PlanrError::PermissionDenied {
                principal: principal_key(principal),
                action: ACTION_PLAN.to_string(),
            });
        }

        // Audit hook: once per call with a principal, fire-and-forget.
        if let Some(p) = principal {
            self.record_compliance(p, tasks.len()).await;
        }

        // Validation, with the batch-size degrade path.
        let report = self.validator.validate(tasks, constraints).await?;
        if !report.valid {
            if report.batch_size_only() {
                return self.degrade(report, tasks.len(), principal, started);
            }
            let detail = report
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(PlanrError::ValidationFailed(detail));
        }
        let tasks = report.sanitized_tasks;
        let constraints = report.sanitized_constraints;

        // Routing decision; the pipeline executes inside it.
        let route = self
            .router
            .route(&RouteRequest {
                principal: principal_key(principal),
                task_count: tasks.len(),
            })
            .await?;

        // Cache lookup under the per-fingerprint flight lock: a concurrent
        // identical request waits here instead of re-analyzing.
        let fp = fingerprint(&tasks, &constraints, principal)?;
        let flight = self.cache.flight(&fp);
        let _guard = flight.lock().await;

        let now = now_ms();
        if let Some(plan) = self.cache.lookup(&fp, now) {
            self.cache.retire_flight(&fp);
            tracing::debug!(fingerprint = %fp, "result cache hit");
            self.append_ledger(tasks.len(), started, plan.efficiency, &constraints, principal, true);
            return Ok(PlanResponse::planned(plan, tasks.len())
                .from_cache()
                .with_region(route.region));
        }

        match self.run_pipeline(&tasks, &constraints, now, token) {
            Ok(plan) => {
                self.cache.store(fp.clone(), plan.clone(), now);
                self.cache.retire_flight(&fp);
                self.append_ledger(tasks.len(), started, plan.efficiency, &constraints, principal, false);
                tracing::info!(
                    tasks = tasks.len(),
                    phases = plan.phase_count(),
                    efficiency = plan.efficiency,
                    region = %route.region,
                    "plan created"
                );
                Ok(PlanResponse::planned(plan, tasks.len()).with_region(route.region))
            }
            Err(err) => {
                self.cache.retire_flight(&fp);
                Err(err)
            }
        }
    }

    /// The four pipeline stages, all on per-call state.
    fn run_pipeline(
        &self,
        tasks: &[Task],
        constraints: &Constraints,
        now: i64,
        token: &CancelToken,
    ) -> Result<Plan> {
        let mut states = scoring::score_all(tasks, constraints, &self.config.scoring)?;
        phases::rank(&mut states);
        let conflicts = self.analyzer.analyze(tasks, now, token)?;
        let built = phases::build(&states, &conflicts, constraints.effective_concurrency(), token)?;
        token.checkpoint()?;
        Ok(metrics::finalize(built))
    }

    /// Degraded batch-size path: truncated tasks, one task per phase.
    fn degrade(
        &self,
        report: ValidationReport,
        original_count: usize,
        principal: Option<&Principal>,
        started: Instant,
    ) -> Result<PlanResponse> {
        let retained = report.sanitized_tasks;
        let plan = metrics::sequential(&retained);
        tracing::warn!(
            original = original_count,
            retained = retained.len(),
            "batch truncated to validator limit"
        );
        self.append_ledger(
            retained.len(),
            started,
            plan.efficiency,
            &report.sanitized_constraints,
            principal,
            false,
        );
        Ok(PlanResponse::sanitized(plan, retained, original_count))
    }

    async fn record_compliance(&self, principal: &Principal, task_count: usize) {
        let activity = ProcessingActivity {
            principal: principal.cache_key(),
            action: ACTION_PLAN.to_string(),
            task_count,
            timestamp: now_ms(),
        };
        if let Err(error) = self.compliance.record_activity(activity).await {
            tracing::warn!(error = %error, "compliance hook failed");
        }
    }

    fn append_ledger(
        &self,
        task_count: usize,
        started: Instant,
        efficiency: f64,
        constraints: &Constraints,
        principal: Option<&Principal>,
        cached: bool,
    ) {
        self.ledger.append(LedgerRecord {
            timestamp: now_ms(),
            task_count,
            duration_ms: started.elapsed().as_millis() as u64,
            efficiency,
            constraints: constraints.clone(),
            principal: principal_key(principal),
            cached,
        });
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new()
    }
}
