//! Console engine: backend IO, job transport and timers.
mod api;
mod engine;
mod knowledge;
mod schedule;
mod transport;
mod types;

pub use api::{ApiSettings, ByteStream, ExecutionApi, ReqwestApi, DEFAULT_BASE_URL};
pub use engine::EngineHandle;
pub use knowledge::KnowledgeBaseClient;
pub use schedule::{JobScope, ScheduledTask};
pub use transport::{
    track_job, ChannelUpdateSink, TransportSettings, UpdateSink, DEFAULT_POLL_INTERVAL,
};
pub use types::{
    ApiError, Channel, EngineEvent, JobId, ResultFetch, StatusPayload, SubmissionId, Terminal,
    TimerKey, WireStep,
};
