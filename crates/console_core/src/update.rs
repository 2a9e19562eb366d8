use console_logging::{console_debug, console_info};

use crate::normalize::normalize;
use crate::reveal::{RevealStep, REVEAL_INTERVAL};
use crate::{
    AppState, Effect, FinalResult, JobStatus, JobUpdate, LogLevel, Msg, Region, SessionState,
    UpdateChannel,
};

const EMPTY_INPUT_NOTICE: &str = "Please enter product requirements!";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            state.set_input(text);
            Vec::new()
        }
        Msg::SubmitClicked => submit(&mut state),
        Msg::SubmissionAccepted { submission, job_id } => {
            if state.session() != SessionState::Submitting || !state.settle_submission(submission)
            {
                console_debug!(
                    "Ignoring ack {} for submission {} (awaiting {:?})",
                    job_id,
                    submission,
                    state.pending_submission()
                );
                return (state, Vec::new());
            }
            state.start_tracking(job_id.clone());
            state.push_log(
                LogLevel::Info,
                format!("Orchestration started, Execution ID: {job_id}"),
            );
            vec![Effect::TrackJob { job_id }]
        }
        Msg::SubmissionFailed {
            submission,
            message,
        } => {
            if state.session() == SessionState::Submitting && state.settle_submission(submission) {
                state.push_log(LogLevel::Error, format!("Error: {message}"));
                state.set_session(SessionState::Failed);
            } else {
                console_debug!("Ignoring failure of submission {}: {}", submission, message);
            }
            Vec::new()
        }
        Msg::JobUpdate {
            job_id,
            channel,
            update,
        } => {
            if is_stale(&state, &job_id, "update") {
                return (state, Vec::new());
            }
            state.set_channel(channel);
            apply_job_update(&mut state, &job_id, update)
        }
        Msg::TransportFellBack { job_id, reason } => {
            if is_stale(&state, &job_id, "fallback notice") {
                return (state, Vec::new());
            }
            state.set_channel(UpdateChannel::Pull);
            state.push_log(
                LogLevel::Info,
                format!("Live stream unavailable ({reason}); polling for status"),
            );
            Vec::new()
        }
        Msg::ResultLoaded { job_id, result } => {
            if is_stale(&state, &job_id, "result") {
                return (state, Vec::new());
            }
            let finalization = state.tracker_mut().and_then(|tracker| {
                tracker.record_final_result(result);
                tracker.take_finalization()
            });
            match finalization {
                Some(result) => finalize(&mut state, &job_id, result),
                None => Vec::new(),
            }
        }
        Msg::ResultUnavailable { job_id, message } => {
            if is_stale(&state, &job_id, "result failure") {
                return (state, Vec::new());
            }
            if state.session() == SessionState::AwaitingResult {
                state.push_log(
                    LogLevel::Error,
                    format!("Failed to load results: {message}"),
                );
                state.set_session(SessionState::Completed);
            }
            Vec::new()
        }
        Msg::RevealTick { job_id, region } => {
            if is_stale(&state, &job_id, "reveal tick") {
                return (state, Vec::new());
            }
            match state.writer_mut().tick(region) {
                RevealStep::Continue => vec![Effect::ScheduleReveal {
                    job_id,
                    region,
                    after: REVEAL_INTERVAL,
                }],
                RevealStep::Finished | RevealStep::Idle => Vec::new(),
            }
        }
        Msg::ResetClicked => {
            let had_job = state.active_job_id().is_some();
            state.clear_job();
            state.set_session(SessionState::Idle);
            if had_job {
                vec![Effect::StopTracking]
            } else {
                Vec::new()
            }
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn is_stale(state: &AppState, job_id: &str, what: &str) -> bool {
    if state.is_active_job(job_id) {
        return false;
    }
    console_debug!(
        "Dropping stale {} for job {} (active: {:?})",
        what,
        job_id,
        state.active_job_id()
    );
    true
}

fn submit(state: &mut AppState) -> Vec<Effect> {
    if !state.session().accepts_submission() {
        return Vec::new();
    }
    let user_input = state.input().trim().to_string();
    if user_input.is_empty() {
        state.set_notice(EMPTY_INPUT_NOTICE);
        return Vec::new();
    }

    let had_job = state.active_job_id().is_some();
    state.clear_job();
    state.set_session(SessionState::Submitting);

    let mut effects = Vec::with_capacity(2);
    if had_job {
        effects.push(Effect::StopTracking);
    }
    let submission = state.begin_submission();
    effects.push(Effect::SubmitJob {
        submission,
        user_input,
    });
    effects
}

fn apply_job_update(state: &mut AppState, job_id: &str, update: JobUpdate) -> Vec<Effect> {
    let Some(applied) = state.apply_update(update) else {
        return Vec::new();
    };

    for entry in &applied.new_entries {
        state.push_log(LogLevel::Info, format!("[{}] {}", entry.step, entry.message));
    }

    let mut effects = Vec::new();
    for region in applied.changed_regions {
        if let Some(content) = state.partial(region) {
            effects.extend(reveal(state, job_id, region, &normalize(&content)));
        }
    }

    match applied.terminal {
        Some(JobStatus::Error) => {
            let message = state
                .tracker()
                .and_then(|tracker| tracker.error())
                .unwrap_or("Unknown error")
                .to_string();
            state.push_log(LogLevel::Error, format!("Execution failed: {message}"));
            state.set_session(SessionState::Failed);
        }
        Some(JobStatus::Completed) => {
            match state.tracker_mut().and_then(|tracker| tracker.take_finalization()) {
                Some(result) => effects.extend(finalize(state, job_id, result)),
                None => state.set_session(SessionState::AwaitingResult),
            }
        }
        _ => {}
    }
    effects
}

fn finalize(state: &mut AppState, job_id: &str, result: FinalResult) -> Vec<Effect> {
    console_info!("Finalizing job {}", job_id);
    state.set_highlights(result.highlights());
    let effects = Region::ALL
        .iter()
        .filter_map(|&region| {
            let content = result.region(region)?;
            reveal(state, job_id, region, &normalize(content))
        })
        .collect();
    state.push_log(LogLevel::Info, "Results ready");
    state.set_session(SessionState::Completed);
    effects
}

fn reveal(state: &mut AppState, job_id: &str, region: Region, markdown: &str) -> Option<Effect> {
    state
        .writer_mut()
        .reveal(region, markdown)
        .then(|| Effect::ScheduleReveal {
            job_id: job_id.to_string(),
            region,
            after: REVEAL_INTERVAL,
        })
}
