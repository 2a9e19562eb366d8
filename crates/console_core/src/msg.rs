use crate::{FinalResult, JobId, JobUpdate, Region, SubmissionId};

/// Which channel delivered an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateChannel {
    Push,
    Pull,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the requirement input.
    InputChanged(String),
    /// User pressed submit.
    SubmitClicked,
    /// Backend accepted the submission and assigned an execution id.
    SubmissionAccepted {
        submission: SubmissionId,
        job_id: JobId,
    },
    /// Submission request failed or was rejected.
    SubmissionFailed {
        submission: SubmissionId,
        message: String,
    },
    /// Status update for a job, from either channel.
    JobUpdate {
        job_id: JobId,
        channel: UpdateChannel,
        update: JobUpdate,
    },
    /// Push channel broke; the transport switched to polling.
    TransportFellBack { job_id: JobId, reason: String },
    /// Final result fetched from the result endpoint.
    ResultLoaded { job_id: JobId, result: FinalResult },
    /// Result endpoint did not deliver a result.
    ResultUnavailable { job_id: JobId, message: String },
    /// Scheduled reveal step for one pane.
    RevealTick { job_id: JobId, region: Region },
    /// User discarded the current session.
    ResetClicked,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
