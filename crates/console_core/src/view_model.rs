use crate::{
    JobId, JobStatus, LogEntry, NodeState, Region, SessionState, Step, SummaryHighlights,
    UpdateChannel,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    pub submit_enabled: bool,
    /// Inline validation notice next to the input.
    pub notice: Option<String>,
    pub job_id: Option<JobId>,
    pub status: Option<JobStatus>,
    pub channel: Option<UpdateChannel>,
    pub nodes: Vec<NodeView>,
    pub log: Vec<LogEntry>,
    pub regions: Vec<RegionView>,
    pub highlights: Option<SummaryHighlights>,
    pub dirty: bool,
}

impl AppViewModel {
    pub fn node(&self, step: Step) -> Option<NodeState> {
        self.nodes
            .iter()
            .find(|node| node.step == step)
            .map(|node| node.state)
    }

    pub fn region(&self, region: Region) -> Option<&RegionView> {
        self.regions.iter().find(|view| view.region == region)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeView {
    pub step: Step,
    pub state: NodeState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionView {
    pub region: Region,
    /// Canonical text revealed so far, cursor glyph included while revealing.
    pub text: String,
    pub revealing: bool,
}
