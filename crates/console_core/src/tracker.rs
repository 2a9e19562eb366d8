use std::collections::BTreeMap;

use console_logging::console_debug;

use crate::{FinalResult, JobId, JobStatus, JobUpdate, Region, RenderableContent, Step, StepEntry};

const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Waiting,
    Active,
    Completed,
    Failed,
}

/// What one update changed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppliedUpdate {
    pub new_entries: Vec<StepEntry>,
    pub changed_regions: Vec<Region>,
    pub terminal: Option<JobStatus>,
}

/// Client-side view of one in-flight job.
///
/// Latches on the first terminal update: later updates are ignored, but a
/// completed job still accepts its final result exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionTracker {
    job_id: JobId,
    status: JobStatus,
    current_step: Option<String>,
    step_log: Vec<StepEntry>,
    partial_results: BTreeMap<Region, RenderableContent>,
    final_result: Option<FinalResult>,
    error: Option<String>,
    latched: bool,
    finalized: bool,
}

impl ExecutionTracker {
    pub fn new(job_id: impl Into<JobId>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Pending,
            current_step: None,
            step_log: Vec::new(),
            partial_results: BTreeMap::new(),
            final_result: None,
            error: None,
            latched: false,
            finalized: false,
        }
    }

    pub fn apply(&mut self, update: JobUpdate) -> AppliedUpdate {
        if self.latched {
            console_debug!("Job {} is latched; ignoring update", self.job_id);
            return AppliedUpdate::default();
        }
        let terminal = update.terminal_status();

        // `steps` is cumulative; only the tail past what we hold is new.
        let new_entries: Vec<StepEntry> =
            update.steps.into_iter().skip(self.step_log.len()).collect();
        self.step_log.extend(new_entries.iter().cloned());

        if let Some(step) = update.current_step {
            self.current_step = Some(step);
        }

        if let Some(status) = update.status {
            let regresses = status == JobStatus::Pending && self.status != JobStatus::Pending;
            if !regresses {
                self.status = status;
            }
        }

        let mut changed_regions = Vec::new();
        for (region, content) in update.partials {
            if self.partial_results.get(&region) != Some(&content) {
                self.partial_results.insert(region, content);
                changed_regions.push(region);
            }
        }

        if self.final_result.is_none() {
            self.final_result = update.final_result;
        }

        match terminal {
            Some(JobStatus::Error) => {
                self.status = JobStatus::Error;
                self.error = Some(update.error.unwrap_or_else(|| UNKNOWN_ERROR.to_string()));
                self.latched = true;
            }
            Some(JobStatus::Completed) => {
                self.status = JobStatus::Completed;
                self.latched = true;
            }
            _ => {}
        }

        AppliedUpdate {
            new_entries,
            changed_regions,
            terminal,
        }
    }

    /// Stores a separately fetched result; the first one wins.
    pub fn record_final_result(&mut self, result: FinalResult) {
        if self.final_result.is_none() {
            self.final_result = Some(result);
        }
    }

    /// Hands out the final result once the job has completed, at most once.
    pub fn take_finalization(&mut self) -> Option<FinalResult> {
        if self.finalized || self.status != JobStatus::Completed {
            return None;
        }
        let result = self.final_result.clone()?;
        self.finalized = true;
        Some(result)
    }

    pub fn node_states(&self) -> Vec<(Step, NodeState)> {
        Step::NODES
            .iter()
            .map(|&step| (step, self.node_state(step)))
            .collect()
    }

    fn node_state(&self, step: Step) -> NodeState {
        let name = step.as_str();
        let is_current = self.current_step.as_deref() == Some(name);
        let logged = self.step_log.iter().any(|entry| entry.step == name);
        match self.status {
            JobStatus::Completed => NodeState::Completed,
            JobStatus::Error if is_current => NodeState::Failed,
            JobStatus::Pending | JobStatus::Running if is_current => NodeState::Active,
            _ if logged => NodeState::Completed,
            _ => NodeState::Waiting,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn current_step(&self) -> Option<&str> {
        self.current_step.as_deref()
    }

    pub fn step_log(&self) -> &[StepEntry] {
        &self.step_log
    }

    pub fn partial(&self, region: Region) -> Option<&RenderableContent> {
        self.partial_results.get(&region)
    }

    pub fn final_result(&self) -> Option<&FinalResult> {
        self.final_result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_latched(&self) -> bool {
        self.latched
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}
