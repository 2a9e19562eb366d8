use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use console_logging::{console_debug, console_error, console_info};

use crate::api::{ApiSettings, ExecutionApi, ReqwestApi};
use crate::schedule::{JobScope, ScheduledTask};
use crate::transport::{track_job, ChannelUpdateSink, TransportSettings, UpdateSink};
use crate::{ApiError, EngineEvent, JobId, SubmissionId, TimerKey};

enum EngineCommand {
    Submit {
        submission: SubmissionId,
        user_input: String,
    },
    Track { job_id: JobId },
    StopTracking,
    Schedule { key: TimerKey, after: Duration },
}

/// Runs network work and timers on a background runtime; results come
/// back as `EngineEvent`s.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(api: &ApiSettings, transport: TransportSettings) -> Result<Self, ApiError> {
        let api: Arc<dyn ExecutionApi> = Arc::new(ReqwestApi::new(api)?);
        Ok(Self::with_api(api, transport))
    }

    pub fn with_api(api: Arc<dyn ExecutionApi>, transport: TransportSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    console_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            let mut scope = JobScope::new();
            while let Ok(command) = cmd_rx.recv() {
                handle_command(&runtime, &mut scope, &api, &transport, &event_tx, command);
            }
            scope.stop();
            console_debug!("Engine command channel closed");
        });

        Self { cmd_tx, event_rx }
    }

    /// The reply comes back as `EngineEvent::Submitted` tagged with `submission`.
    pub fn submit(&self, submission: SubmissionId, user_input: impl Into<String>) {
        self.send(EngineCommand::Submit {
            submission,
            user_input: user_input.into(),
        });
    }

    /// Starts delivering updates for `job_id`, ending any previous job's work.
    pub fn track(&self, job_id: impl Into<JobId>) {
        self.send(EngineCommand::Track {
            job_id: job_id.into(),
        });
    }

    /// Ends transport and pending timers for the tracked job.
    pub fn stop_tracking(&self) {
        self.send(EngineCommand::StopTracking);
    }

    /// Emits `EngineEvent::TimerFired { key }` after `after`, unless the
    /// job scope is stopped first.
    pub fn schedule(&self, key: TimerKey, after: Duration) {
        self.send(EngineCommand::Schedule { key, after });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Waits up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            console_error!("Engine thread is gone; command dropped");
        }
    }
}

fn handle_command(
    runtime: &tokio::runtime::Runtime,
    scope: &mut JobScope,
    api: &Arc<dyn ExecutionApi>,
    transport: &TransportSettings,
    event_tx: &mpsc::Sender<EngineEvent>,
    command: EngineCommand,
) {
    match command {
        EngineCommand::Submit {
            submission,
            user_input,
        } => {
            let api = api.clone();
            let sink = ChannelUpdateSink::new(event_tx.clone());
            runtime.spawn(async move {
                let result = api.submit(&user_input).await;
                sink.emit(EngineEvent::Submitted { submission, result });
            });
        }
        EngineCommand::Track { job_id } => {
            let cancel = scope.restart();
            console_info!("Tracking job {}", job_id);
            let api = api.clone();
            let transport = transport.clone();
            let sink = ChannelUpdateSink::new(event_tx.clone());
            runtime.spawn(async move {
                track_job(api.as_ref(), &job_id, &sink, &transport, &cancel).await;
            });
        }
        EngineCommand::StopTracking => {
            scope.restart();
        }
        EngineCommand::Schedule { key, after } => {
            let sink = ChannelUpdateSink::new(event_tx.clone());
            ScheduledTask::after(runtime.handle(), scope.token(), after, move || {
                sink.emit(EngineEvent::TimerFired { key });
            });
        }
    }
}
