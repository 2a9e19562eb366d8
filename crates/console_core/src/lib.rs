//! Console core: pure execution-tracking state machine, content normalization,
//! rendering and reveal bookkeeping. No IO, no clocks.
mod content;
mod effect;
mod job;
mod msg;
mod normalize;
mod render;
mod reveal;
mod state;
mod tracker;
mod update;
mod view_model;

pub use content::RenderableContent;
pub use effect::Effect;
pub use job::{
    FinalResult, JobId, JobStatus, JobUpdate, Region, Step, StepEntry, SubmissionId, SummaryHighlights,
};
pub use msg::{Msg, UpdateChannel};
pub use normalize::{humanize_key, normalize, normalize_text, strip_code_fence, INLINE_VALUE_LIMIT};
pub use render::{
    preformatted, render_canonical, MarkdownRenderer, RenderError, RenderOutcome, RenderedRegion,
    Renderer, MAX_RENDER_BYTES, NO_CONTENT_PLACEHOLDER,
};
pub use reveal::{
    IncrementalWriter, RevealStep, CURSOR_GLYPH, REVEAL_CHUNK_CHARS, REVEAL_INTERVAL,
};
pub use state::{AppState, LogEntry, LogLevel, SessionState};
pub use tracker::{AppliedUpdate, ExecutionTracker, NodeState};
pub use update::update;
pub use view_model::{AppViewModel, NodeView, RegionView};
