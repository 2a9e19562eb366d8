use std::time::Duration;

use crate::{JobId, Region, SubmissionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// The reply must come back tagged with `submission`.
    SubmitJob {
        submission: SubmissionId,
        user_input: String,
    },
    /// Open the update channel for a job, replacing any previous one.
    TrackJob { job_id: JobId },
    /// Close the channel and cancel timers of the current job.
    StopTracking,
    /// Deliver `Msg::RevealTick` after `after`.
    ScheduleReveal {
        job_id: JobId,
        region: Region,
        after: Duration,
    },
}
