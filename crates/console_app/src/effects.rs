use std::time::Duration;

use console_core::{
    Effect, FinalResult, JobStatus, JobUpdate, Msg, Region, RenderableContent, StepEntry,
    UpdateChannel,
};
use console_engine::{ApiError, Channel, EngineEvent, EngineHandle, ResultFetch, StatusPayload, TimerKey};
use console_logging::{console_debug, console_info, console_warn};

const RESULT_PENDING: &str = "result is not ready yet";
const RESULT_EMPTY: &str = "result was empty";

/// Hands core effects to the engine and turns engine events back into
/// core messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitJob {
                    submission,
                    user_input,
                } => {
                    console_info!(
                        "SubmitJob submission={} input_len={}",
                        submission,
                        user_input.len()
                    );
                    self.engine.submit(submission, user_input);
                }
                Effect::TrackJob { job_id } => {
                    self.engine.track(job_id);
                }
                Effect::StopTracking => {
                    self.engine.stop_tracking();
                }
                Effect::ScheduleReveal {
                    job_id,
                    region,
                    after,
                } => {
                    self.engine.schedule(
                        TimerKey {
                            job_id,
                            tag: region.as_str().to_string(),
                        },
                        after,
                    );
                }
            }
        }
    }

    /// Next engine event as a message, or `None` once `timeout` passes.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(event_to_msg)
    }

    pub fn stop(&self) {
        self.engine.stop_tracking();
    }
}

pub fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Submitted {
            submission,
            result: Ok(job_id),
        } => Msg::SubmissionAccepted { submission, job_id },
        EngineEvent::Submitted {
            submission,
            result: Err(err),
        } => {
            console_warn!("Submission {} failed: {}", submission, err);
            Msg::SubmissionFailed {
                submission,
                message: err.to_string(),
            }
        }
        EngineEvent::Update {
            job_id,
            channel,
            payload,
        } => Msg::JobUpdate {
            job_id,
            channel: match channel {
                Channel::Push => UpdateChannel::Push,
                Channel::Pull => UpdateChannel::Pull,
            },
            update: job_update(payload),
        },
        EngineEvent::FellBack { job_id, reason } => Msg::TransportFellBack { job_id, reason },
        EngineEvent::Result { job_id, result } => result_msg(job_id, result),
        EngineEvent::TimerFired { key } => match Region::parse(&key.tag) {
            Some(region) => Msg::RevealTick {
                job_id: key.job_id,
                region,
            },
            None => {
                console_debug!("Ignoring timer with unknown tag {}", key.tag);
                Msg::NoOp
            }
        },
    }
}

/// Converts a wire payload into the core's typed update.
pub fn job_update(payload: StatusPayload) -> JobUpdate {
    let StatusPayload {
        current_step,
        steps,
        status,
        partial_research,
        partial_evaluation,
        partial_summary,
        partial_documentation,
        final_result,
        error,
        done,
    } = payload;

    let partials = [
        (Region::Research, partial_research),
        (Region::Evaluation, partial_evaluation),
        (Region::Summary, partial_summary),
        (Region::Documentation, partial_documentation),
    ]
    .into_iter()
    .filter_map(|(region, value)| Some((region, RenderableContent::from_json(value?)?)))
    .collect();

    JobUpdate {
        current_step,
        steps: steps
            .into_iter()
            .map(|entry| StepEntry::new(entry.step, entry.message))
            .collect(),
        status: status.as_deref().and_then(JobStatus::parse),
        partials,
        final_result: final_result
            .and_then(RenderableContent::from_json)
            .map(|content| FinalResult::from_content(&content)),
        error,
        done,
    }
}

fn result_msg(job_id: String, result: Result<ResultFetch, ApiError>) -> Msg {
    match result {
        Ok(ResultFetch::Ready(value)) => match RenderableContent::from_json(value) {
            Some(content) => Msg::ResultLoaded {
                job_id,
                result: FinalResult::from_content(&content),
            },
            None => Msg::ResultUnavailable {
                job_id,
                message: RESULT_EMPTY.to_string(),
            },
        },
        Ok(ResultFetch::Pending) => Msg::ResultUnavailable {
            job_id,
            message: RESULT_PENDING.to_string(),
        },
        Err(err) => Msg::ResultUnavailable {
            job_id,
            message: err.to_string(),
        },
    }
}
