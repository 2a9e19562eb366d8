use crate::view_model::{AppViewModel, NodeView, RegionView};
use crate::{
    AppliedUpdate, ExecutionTracker, IncrementalWriter, JobUpdate, NodeState, Region,
    RenderableContent, Step, SubmissionId, SummaryHighlights, UpdateChannel,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Submitting,
    Tracking,
    AwaitingResult,
    Completed,
    Failed,
}

impl SessionState {
    /// Whether the submit control is enabled.
    pub fn accepts_submission(self) -> bool {
        matches!(self, Self::Idle | Self::Completed | Self::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

/// One line of the user-visible audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// Session controller state: at most one tracked job at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    input: String,
    session: SessionState,
    notice: Option<String>,
    tracker: Option<ExecutionTracker>,
    writer: IncrementalWriter,
    log: Vec<LogEntry>,
    channel: Option<UpdateChannel>,
    highlights: Option<SummaryHighlights>,
    /// Last id handed out; never reused within a session.
    last_submission: SubmissionId,
    pending_submission: Option<SubmissionId>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let nodes = match &self.tracker {
            Some(tracker) => tracker
                .node_states()
                .into_iter()
                .map(|(step, state)| NodeView { step, state })
                .collect(),
            None => Step::NODES
                .iter()
                .map(|&step| NodeView {
                    step,
                    state: NodeState::Waiting,
                })
                .collect(),
        };
        let regions = Region::ALL
            .iter()
            .map(|&region| RegionView {
                region,
                text: self.writer.visible_text(region),
                revealing: self.writer.is_revealing(region),
            })
            .collect();

        AppViewModel {
            session: self.session,
            submit_enabled: self.session.accepts_submission(),
            notice: self.notice.clone(),
            job_id: self.active_job_id().map(ToOwned::to_owned),
            status: self.tracker.as_ref().map(ExecutionTracker::status),
            channel: self.channel,
            nodes,
            log: self.log.clone(),
            regions,
            highlights: self.highlights.clone(),
            dirty: self.dirty,
        }
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn tracker(&self) -> Option<&ExecutionTracker> {
        self.tracker.as_ref()
    }

    pub fn writer(&self) -> &IncrementalWriter {
        &self.writer
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn active_job_id(&self) -> Option<&str> {
        self.tracker.as_ref().map(ExecutionTracker::job_id)
    }

    pub fn is_active_job(&self, job_id: &str) -> bool {
        self.active_job_id() == Some(job_id)
    }

    /// Submission whose reply is still awaited.
    pub fn pending_submission(&self) -> Option<SubmissionId> {
        self.pending_submission
    }

    /// Settled: nothing in flight and no pane still revealing.
    pub fn is_settled(&self) -> bool {
        matches!(
            self.session,
            SessionState::Idle | SessionState::Completed | SessionState::Failed
        ) && self.writer.is_idle()
    }

    /// Returns whether the state changed since the last call, clearing the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_input(&mut self, input: String) {
        self.input = input;
        if self.notice.take().is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
        self.mark_dirty();
    }

    pub(crate) fn set_session(&mut self, session: SessionState) {
        if self.session != session {
            self.session = session;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_channel(&mut self, channel: UpdateChannel) {
        if self.channel != Some(channel) {
            self.channel = Some(channel);
            self.mark_dirty();
        }
    }

    pub(crate) fn set_highlights(&mut self, highlights: Option<SummaryHighlights>) {
        self.highlights = highlights;
        self.mark_dirty();
    }

    pub(crate) fn push_log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.log.push(LogEntry {
            level,
            message: message.into(),
        });
        self.mark_dirty();
    }

    /// Clears everything job-scoped; the typed input survives.
    pub(crate) fn clear_job(&mut self) {
        self.tracker = None;
        self.writer.reset();
        self.log.clear();
        self.channel = None;
        self.highlights = None;
        self.notice = None;
        self.pending_submission = None;
        self.mark_dirty();
    }

    pub(crate) fn begin_submission(&mut self) -> SubmissionId {
        self.last_submission += 1;
        self.pending_submission = Some(self.last_submission);
        self.last_submission
    }

    /// Consumes the pending submission if `submission` is the one awaited.
    pub(crate) fn settle_submission(&mut self, submission: SubmissionId) -> bool {
        if self.pending_submission == Some(submission) {
            self.pending_submission = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn start_tracking(&mut self, job_id: String) {
        self.tracker = Some(ExecutionTracker::new(job_id));
        self.channel = Some(UpdateChannel::Push);
        self.set_session(SessionState::Tracking);
        self.mark_dirty();
    }

    pub(crate) fn apply_update(&mut self, update: JobUpdate) -> Option<AppliedUpdate> {
        let applied = self.tracker.as_mut()?.apply(update);
        self.mark_dirty();
        Some(applied)
    }

    pub(crate) fn tracker_mut(&mut self) -> Option<&mut ExecutionTracker> {
        self.tracker.as_mut()
    }

    pub(crate) fn partial(&self, region: Region) -> Option<RenderableContent> {
        self.tracker.as_ref()?.partial(region).cloned()
    }

    pub(crate) fn writer_mut(&mut self) -> &mut IncrementalWriter {
        self.mark_dirty();
        &mut self.writer
    }
}
