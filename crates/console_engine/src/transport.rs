//! Per-job update delivery: the push stream first, status polling once the
//! stream is gone.

use std::time::Duration;

use console_logging::{console_debug, console_info, console_warn};
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::api::ExecutionApi;
use crate::{Channel, EngineEvent, StatusPayload, Terminal};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub poll_interval: Duration,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

pub trait UpdateSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelUpdateSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelUpdateSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl UpdateSink for ChannelUpdateSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[derive(Debug, PartialEq, Eq)]
enum PushOutcome {
    /// A terminal message arrived; the stream is done.
    Finished { fetch_result: bool },
    /// The stream could not be opened or ended early.
    Lost(String),
}

/// Delivers updates for `job_id` until the job is terminal or `cancel` fires.
///
/// At most one channel is live at a time: polling only starts after the
/// push stream has been given up.
pub async fn track_job(
    api: &dyn ExecutionApi,
    job_id: &str,
    sink: &dyn UpdateSink,
    settings: &TransportSettings,
    cancel: &CancellationToken,
) {
    tokio::select! {
        _ = cancel.cancelled() => {
            console_debug!("Tracking for {} cancelled", job_id);
        }
        _ = run(api, job_id, sink, settings) => {
            console_debug!("Tracking for {} finished", job_id);
        }
    }
}

async fn run(
    api: &dyn ExecutionApi,
    job_id: &str,
    sink: &dyn UpdateSink,
    settings: &TransportSettings,
) {
    match run_push(api, job_id, sink).await {
        PushOutcome::Finished { fetch_result } => {
            if fetch_result {
                fetch_result_once(api, job_id, sink).await;
            }
        }
        PushOutcome::Lost(reason) => {
            console_info!("Push channel for {} lost ({}); polling", job_id, reason);
            sink.emit(EngineEvent::FellBack {
                job_id: job_id.to_string(),
                reason,
            });
            run_poll(api, job_id, sink, settings).await;
        }
    }
}

async fn run_push(api: &dyn ExecutionApi, job_id: &str, sink: &dyn UpdateSink) -> PushOutcome {
    let stream = match api.open_stream(job_id).await {
        Ok(stream) => stream,
        Err(err) => return PushOutcome::Lost(err.to_string()),
    };

    let mut events = stream.eventsource();
    while let Some(event) = events.next().await {
        let event = match event {
            Ok(event) => event,
            Err(err) => return PushOutcome::Lost(format!("stream error: {err}")),
        };
        if event.data.trim().is_empty() {
            continue;
        }
        let payload: StatusPayload = match serde_json::from_str(&event.data) {
            Ok(payload) => payload,
            Err(err) => {
                console_warn!("Skipping malformed stream message for {}: {}", job_id, err);
                continue;
            }
        };

        let terminal = payload.terminal();
        let fetch_result =
            terminal == Some(Terminal::Completed) && payload.final_result.is_none();
        sink.emit(EngineEvent::Update {
            job_id: job_id.to_string(),
            channel: Channel::Push,
            payload,
        });
        if terminal.is_some() {
            return PushOutcome::Finished { fetch_result };
        }
    }
    PushOutcome::Lost("stream closed before completion".to_string())
}

async fn run_poll(
    api: &dyn ExecutionApi,
    job_id: &str,
    sink: &dyn UpdateSink,
    settings: &TransportSettings,
) {
    let mut interval = tokio::time::interval(settings.poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        let payload = match api.status(job_id).await {
            Ok(payload) => payload,
            Err(err) => {
                console_warn!("Status poll for {} failed: {}", job_id, err);
                continue;
            }
        };
        let terminal = payload.terminal();
        sink.emit(EngineEvent::Update {
            job_id: job_id.to_string(),
            channel: Channel::Pull,
            payload,
        });
        match terminal {
            Some(Terminal::Completed) => {
                fetch_result_once(api, job_id, sink).await;
                return;
            }
            Some(Terminal::Failed) => return,
            None => {}
        }
    }
}

async fn fetch_result_once(api: &dyn ExecutionApi, job_id: &str, sink: &dyn UpdateSink) {
    let result = api.result(job_id).await;
    if let Err(err) = &result {
        console_warn!("Result fetch for {} failed: {}", job_id, err);
    }
    sink.emit(EngineEvent::Result {
        job_id: job_id.to_string(),
        result,
    });
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use futures_util::stream;

    use super::*;
    use crate::api::ByteStream;
    use crate::{ApiError, JobId, ResultFetch};

    struct ScriptedApi {
        stream_body: Option<&'static str>,
    }

    #[async_trait::async_trait]
    impl ExecutionApi for ScriptedApi {
        async fn submit(&self, _user_input: &str) -> Result<JobId, ApiError> {
            Ok("job".to_string())
        }

        async fn status(&self, _job_id: &str) -> Result<StatusPayload, ApiError> {
            Ok(StatusPayload {
                status: Some("completed".to_string()),
                ..StatusPayload::default()
            })
        }

        async fn result(&self, _job_id: &str) -> Result<ResultFetch, ApiError> {
            Ok(ResultFetch::Pending)
        }

        async fn open_stream(&self, _job_id: &str) -> Result<ByteStream, ApiError> {
            match self.stream_body {
                Some(body) => Ok(stream::iter(vec![Ok(bytes::Bytes::from(body))]).boxed()),
                None => Err(ApiError::Network("refused".to_string())),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<EngineEvent>>,
    }

    impl UpdateSink for RecordingSink {
        fn emit(&self, event: EngineEvent) {
            if let Ok(mut events) = self.events.lock() {
                events.push(event);
            }
        }
    }

    #[tokio::test]
    async fn push_outcome_skips_malformed_messages() {
        let api = ScriptedApi {
            stream_body: Some("data: {not json\n\ndata: {\"status\":\"running\"}\n\ndata: {\"status\":\"error\",\"error\":\"boom\"}\n\n"),
        };
        let sink = RecordingSink::default();

        let outcome = run_push(&api, "job", &sink).await;

        assert_eq!(outcome, PushOutcome::Finished { fetch_result: false });
        assert_eq!(sink.events.lock().map(|e| e.len()).unwrap_or(0), 2);
    }

    #[tokio::test]
    async fn push_outcome_requests_result_when_completion_has_none() {
        let api = ScriptedApi {
            stream_body: Some("data: {\"status\":\"completed\",\"done\":true}\n\n"),
        };
        let sink = RecordingSink::default();

        let outcome = run_push(&api, "job", &sink).await;

        assert_eq!(outcome, PushOutcome::Finished { fetch_result: true });
    }

    #[tokio::test]
    async fn push_outcome_is_lost_when_stream_cannot_open() {
        let api = ScriptedApi { stream_body: None };
        let sink = RecordingSink::default();

        let outcome = run_push(&api, "job", &sink).await;

        assert!(matches!(outcome, PushOutcome::Lost(reason) if reason.contains("refused")));
    }
}
