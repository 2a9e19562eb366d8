use crate::RenderableContent;

/// Opaque execution id assigned by the backend.
pub type JobId = String;
/// Issued per submit; a reply carrying any other id is stale.
pub type SubmissionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Error,
}

impl JobStatus {
    /// Wire status string; unknown values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "idle" | "pending" | "started" => Some(Self::Pending),
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "error" | "failed" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

/// Pipeline stage as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    Initializing,
    Research,
    Evaluation,
    Summarization,
    Documentation,
    Finished,
}

impl Step {
    /// Nodes drawn in the pipeline graph; `Initializing` has none.
    pub const NODES: [Step; 5] = [
        Step::Research,
        Step::Evaluation,
        Step::Summarization,
        Step::Documentation,
        Step::Finished,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "initializing" => Some(Self::Initializing),
            "research" => Some(Self::Research),
            "evaluation" => Some(Self::Evaluation),
            "summarization" => Some(Self::Summarization),
            "documentation" => Some(Self::Documentation),
            "finished" => Some(Self::Finished),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Research => "research",
            Self::Evaluation => "evaluation",
            Self::Summarization => "summarization",
            Self::Documentation => "documentation",
            Self::Finished => "finished",
        }
    }
}

/// One of the four result panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Region {
    Research,
    Evaluation,
    Summary,
    Documentation,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::Research,
        Region::Evaluation,
        Region::Summary,
        Region::Documentation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::Evaluation => "evaluation",
            Self::Summary => "summary",
            Self::Documentation => "documentation",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|region| region.as_str() == raw)
    }

    /// Streaming field carrying this pane's partial content.
    pub fn partial_field(self) -> &'static str {
        match self {
            Self::Research => "partial_research",
            Self::Evaluation => "partial_evaluation",
            Self::Summary => "partial_summary",
            Self::Documentation => "partial_documentation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepEntry {
    /// Step name exactly as reported, known or not.
    pub step: String,
    pub message: String,
}

impl StepEntry {
    pub fn new(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            message: message.into(),
        }
    }
}

/// One parsed status message, from either the push or the pull channel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobUpdate {
    pub current_step: Option<String>,
    /// Cumulative step log as known to the backend at send time.
    pub steps: Vec<StepEntry>,
    pub status: Option<JobStatus>,
    pub partials: Vec<(Region, RenderableContent)>,
    pub final_result: Option<FinalResult>,
    pub error: Option<String>,
    pub done: bool,
}

impl JobUpdate {
    /// Terminal status implied by this update, if any.
    pub fn terminal_status(&self) -> Option<JobStatus> {
        if self.error.is_some() || self.status == Some(JobStatus::Error) {
            return Some(JobStatus::Error);
        }
        if self.status == Some(JobStatus::Completed) || self.done {
            return Some(JobStatus::Completed);
        }
        None
    }
}

/// Completed run output, keyed per pane.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FinalResult {
    pub research: Option<RenderableContent>,
    pub evaluation: Option<RenderableContent>,
    pub summary: Option<RenderableContent>,
    pub documentation: Option<RenderableContent>,
}

impl FinalResult {
    /// Extracts pane contents from the `{agents_outputs, final_summary}` result object.
    pub fn from_content(content: &RenderableContent) -> Self {
        let pick = |path: &[&str]| content.get_path(path).cloned();
        Self {
            research: pick(&["agents_outputs", "product_researcher", "research_result"]),
            evaluation: pick(&[
                "agents_outputs",
                "feasibility_evaluator",
                "evaluation_result",
            ]),
            summary: pick(&["final_summary"]),
            documentation: pick(&["agents_outputs", "doc_assistant", "document"]),
        }
    }

    pub fn region(&self, region: Region) -> Option<&RenderableContent> {
        match region {
            Region::Research => self.research.as_ref(),
            Region::Evaluation => self.evaluation.as_ref(),
            Region::Summary => self.summary.as_ref(),
            Region::Documentation => self.documentation.as_ref(),
        }
    }

    pub fn highlights(&self) -> Option<SummaryHighlights> {
        self.summary.as_ref().and_then(SummaryHighlights::from_summary)
    }
}

/// Headline figures shown above the panes once a run completes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SummaryHighlights {
    pub feasibility_score: Option<String>,
    pub value_propositions: Vec<String>,
    pub success_factors: Vec<String>,
    pub raw_summary: Option<String>,
}

impl SummaryHighlights {
    pub fn from_summary(summary: &RenderableContent) -> Option<Self> {
        let text = |key: &str| {
            summary
                .get(key)
                .and_then(RenderableContent::as_text)
                .map(ToOwned::to_owned)
        };
        let items = |key: &str| match summary.get(key) {
            Some(RenderableContent::List(items)) => items
                .iter()
                .filter_map(RenderableContent::as_text)
                .map(ToOwned::to_owned)
                .collect(),
            _ => Vec::new(),
        };
        let highlights = Self {
            feasibility_score: text("feasibility_score"),
            value_propositions: items("value_propositions"),
            success_factors: items("success_factors"),
            raw_summary: text("raw_summary"),
        };
        (highlights != Self::default()).then_some(highlights)
    }
}
