//! Named upload steps and the runner that executes them in order.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::future::Future;
use std::time::Instant;

use mediastore_core::{AppError, UploadState};

use crate::context::RequestContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStep {
    ValidateRequest,
    ResolveCollection,
    ReserveStaging,
    LoadStaging,
    TransferBytes,
    Finalize,
    ReleaseStaging,
}

/// apply: validate → resolve collection → reserve.
pub const APPLY_STEPS: &[UploadStep] = &[
    UploadStep::ValidateRequest,
    UploadStep::ResolveCollection,
    UploadStep::ReserveStaging,
];

/// single upload: resolve collection → load staging → transfer → finalize → release.
pub const SINGLE_UPLOAD_STEPS: &[UploadStep] = &[
    UploadStep::ResolveCollection,
    UploadStep::LoadStaging,
    UploadStep::TransferBytes,
    UploadStep::Finalize,
    UploadStep::ReleaseStaging,
];

impl UploadStep {
    pub fn name(&self) -> &'static str {
        match self {
            UploadStep::ValidateRequest => "validate_request",
            UploadStep::ResolveCollection => "resolve_collection",
            UploadStep::ReserveStaging => "reserve_staging",
            UploadStep::LoadStaging => "load_staging",
            UploadStep::TransferBytes => "transfer_bytes",
            UploadStep::Finalize => "finalize",
            UploadStep::ReleaseStaging => "release_staging",
        }
    }

    /// States in which the step may start.
    pub fn requires(&self) -> &'static [UploadState] {
        match self {
            UploadStep::ValidateRequest | UploadStep::ReserveStaging => &[UploadState::Requested],
            UploadStep::ResolveCollection => &[UploadState::Requested, UploadState::Reserved],
            UploadStep::LoadStaging | UploadStep::TransferBytes => &[UploadState::Reserved],
            UploadStep::Finalize => &[UploadState::DataReceived],
            UploadStep::ReleaseStaging => &[UploadState::Finalized],
        }
    }

    /// State after the step succeeds, starting from `from`.
    pub fn advance(&self, from: UploadState) -> UploadState {
        match self {
            UploadStep::ReserveStaging => UploadState::Reserved,
            UploadStep::TransferBytes => UploadState::DataReceived,
            UploadStep::Finalize => UploadState::Finalized,
            UploadStep::ValidateRequest
            | UploadStep::ResolveCollection
            | UploadStep::LoadStaging
            | UploadStep::ReleaseStaging => from,
        }
    }

    /// State recorded when the step fails with `err`, if the failure changes it.
    pub fn fail_state(&self, err: &AppError) -> Option<UploadState> {
        match (self, err) {
            (UploadStep::LoadStaging, AppError::NoStagingRecord(_)) => Some(UploadState::Expired),
            _ => None,
        }
    }
}

impl Display for UploadStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

/// One execution of a step list for a single fid.
///
/// Steps must be run in the declared order and only from a state they accept. The
/// first failing step ends the run; its error is returned as-is.
pub struct PipelineRun<'a> {
    ctx: &'a RequestContext,
    steps: &'static [UploadStep],
    next: usize,
    state: UploadState,
    fid: String,
}

impl<'a> PipelineRun<'a> {
    pub fn new(
        ctx: &'a RequestContext,
        steps: &'static [UploadStep],
        initial: UploadState,
        fid: impl Into<String>,
    ) -> Self {
        Self {
            ctx,
            steps,
            next: 0,
            state: initial,
            fid: fid.into(),
        }
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    pub fn set_fid(&mut self, fid: impl Into<String>) {
        self.fid = fid.into();
    }

    /// Run `step`, which must be the next one in the list.
    pub async fn step<T, F>(&mut self, step: UploadStep, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        let expected = self.steps.get(self.next).copied();
        if expected != Some(step) {
            return Err(AppError::Internal(format!(
                "upload step {} out of order (expected {})",
                step,
                expected.map_or("end of pipeline", |s| s.name())
            )));
        }
        if !step.requires().contains(&self.state) {
            return Err(AppError::Internal(format!(
                "upload step {} cannot start in state {}",
                step, self.state
            )));
        }

        let start = Instant::now();
        let result = self.ctx.run(step.name(), fut).await;
        let duration_ms = start.elapsed().as_millis() as u64;
        self.next += 1;

        match &result {
            Ok(_) => {
                let from = self.state;
                self.state = step.advance(from);
                tracing::debug!(
                    fid = %self.fid,
                    step = step.name(),
                    from = %from,
                    to = %self.state,
                    duration_ms,
                    "Upload step completed"
                );
            }
            Err(e) => {
                let from = self.state;
                if let Some(to) = step.fail_state(e) {
                    self.state = to;
                }
                tracing::debug!(
                    fid = %self.fid,
                    step = step.name(),
                    from = %from,
                    to = %self.state,
                    duration_ms,
                    error = %e,
                    "Upload step failed"
                );
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_names() {
        let names: Vec<_> = SINGLE_UPLOAD_STEPS.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            [
                "resolve_collection",
                "load_staging",
                "transfer_bytes",
                "finalize",
                "release_staging"
            ]
        );
    }

    #[test]
    fn test_step_lists_are_state_consistent() {
        for (steps, initial) in [
            (APPLY_STEPS, UploadState::Requested),
            (SINGLE_UPLOAD_STEPS, UploadState::Reserved),
        ] {
            let mut state = initial;
            for step in steps {
                assert!(step.requires().contains(&state), "{} from {}", step, state);
                state = step.advance(state);
            }
        }
    }

    #[tokio::test]
    async fn test_run_advances_state() {
        let ctx = RequestContext::background();
        let mut run = PipelineRun::new(&ctx, APPLY_STEPS, UploadState::Requested, "v1-x");

        run.step(UploadStep::ValidateRequest, async { Ok(()) })
            .await
            .unwrap();
        run.step(UploadStep::ResolveCollection, async { Ok(()) })
            .await
            .unwrap();
        assert_eq!(run.state(), UploadState::Requested);
        run.step(UploadStep::ReserveStaging, async { Ok(()) })
            .await
            .unwrap();
        assert_eq!(run.state(), UploadState::Reserved);
    }

    #[tokio::test]
    async fn test_out_of_order_step_rejected() {
        let ctx = RequestContext::background();
        let mut run = PipelineRun::new(&ctx, SINGLE_UPLOAD_STEPS, UploadState::Reserved, "v1-x");

        let err = run
            .step(UploadStep::TransferBytes, async { Ok(()) })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(run.state(), UploadState::Reserved);
    }

    #[tokio::test]
    async fn test_failed_step_keeps_state() {
        let ctx = RequestContext::background();
        let mut run = PipelineRun::new(&ctx, SINGLE_UPLOAD_STEPS, UploadState::Reserved, "v1-x");
        run.step(UploadStep::ResolveCollection, async { Ok(()) })
            .await
            .unwrap();
        run.step(UploadStep::LoadStaging, async { Ok(()) })
            .await
            .unwrap();

        let err = run
            .step(UploadStep::TransferBytes, async {
                Err::<(), _>(AppError::Storage("disk full".to_string()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(run.state(), UploadState::Reserved);
    }

    #[tokio::test]
    async fn test_missing_reservation_marks_run_expired() {
        let ctx = RequestContext::background();
        let mut run = PipelineRun::new(&ctx, SINGLE_UPLOAD_STEPS, UploadState::Reserved, "v1-x");
        run.step(UploadStep::ResolveCollection, async { Ok(()) })
            .await
            .unwrap();

        let err = run
            .step(UploadStep::LoadStaging, async {
                Err::<(), _>(AppError::NoStagingRecord("v1-x".to_string()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NoStagingRecord(_)));
        assert_eq!(run.state(), UploadState::Expired);

        let err = run
            .step(UploadStep::TransferBytes, async { Ok(()) })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
