use std::collections::BTreeMap;
use std::io::Write;

use chrono::Local;
use console_core::{AppViewModel, LogLevel, NodeState, Region, Step};

use crate::output::{summary_text, OutputError, RegionOutput};

/// Prints the view model to a terminal and mirrors the panes to files.
///
/// Only what changed since the previous call is printed or written.
pub struct Presenter<W: Write> {
    out: W,
    files: RegionOutput,
    printed_log: usize,
    last_notice: Option<String>,
    last_nodes: String,
    last_regions: BTreeMap<Region, String>,
    summary_written: bool,
}

impl<W: Write> Presenter<W> {
    pub fn new(out: W, files: RegionOutput) -> Self {
        Self {
            out,
            files,
            printed_log: 0,
            last_notice: None,
            last_nodes: String::new(),
            last_regions: BTreeMap::new(),
            summary_written: false,
        }
    }

    pub fn present(&mut self, view: &AppViewModel) -> Result<(), OutputError> {
        if view.log.len() < self.printed_log {
            // A new job cleared the log. `last_regions` is kept so panes
            // the old job filled get rewritten below.
            self.printed_log = 0;
            if std::mem::take(&mut self.summary_written) {
                self.files.remove_summary()?;
            }
        }

        if view.notice != self.last_notice {
            if let Some(notice) = &view.notice {
                writeln!(self.out, "{notice}")?;
            }
            self.last_notice = view.notice.clone();
        }

        for entry in &view.log[self.printed_log..] {
            let stamp = Local::now().format("%H:%M:%S");
            match entry.level {
                LogLevel::Info => writeln!(self.out, "[{stamp}] {}", entry.message)?,
                LogLevel::Error => writeln!(self.out, "[{stamp}] ERROR {}", entry.message)?,
            }
        }
        self.printed_log = view.log.len();

        if view.job_id.is_some() {
            let nodes = node_line(view);
            if nodes != self.last_nodes {
                writeln!(self.out, "{nodes}")?;
                self.last_nodes = nodes;
            }
        }

        for region in &view.regions {
            if region.text.is_empty() && !self.last_regions.contains_key(&region.region) {
                continue;
            }
            if self.last_regions.get(&region.region) == Some(&region.text) {
                continue;
            }
            self.files.render_into(region.region, &region.text)?;
            self.last_regions.insert(region.region, region.text.clone());
        }

        if let Some(highlights) = &view.highlights {
            if !self.summary_written {
                self.files.write_summary(highlights)?;
                write!(self.out, "{}", summary_text(highlights))?;
                self.summary_written = true;
            }
        }

        self.out.flush()?;
        Ok(())
    }

    pub fn files(&self) -> &RegionOutput {
        &self.files
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// `research:done evaluation:active ...` for the pipeline nodes.
fn node_line(view: &AppViewModel) -> String {
    let parts: Vec<String> = Step::NODES
        .iter()
        .filter_map(|&step| {
            let state = view.node(step)?;
            let label = match state {
                NodeState::Waiting => "waiting",
                NodeState::Active => "active",
                NodeState::Completed => "done",
                NodeState::Failed => "failed",
            };
            Some(format!("{}:{label}", step.as_str()))
        })
        .collect();
    format!("pipeline {}", parts.join(" "))
}
