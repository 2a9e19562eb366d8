use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use console_core::{
    render_canonical, MarkdownRenderer, Region, RenderOutcome, SummaryHighlights,
};
use console_logging::console_debug;
use tempfile::NamedTempFile;
use thiserror::Error;

pub const SUMMARY_FILE: &str = "summary.txt";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the output directory exists and accepts new files.
pub fn ensure_output_dir(dir: &Path) -> Result<(), OutputError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| OutputError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(OutputError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| OutputError::OutputDir(e.to_string()))?;
    }
    NamedTempFile::new_in(dir).map_err(|e| OutputError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Writes rendered panes as `<dir>/<region>.html`, each file replaced
/// atomically so a reader never sees a half-written pane.
pub struct RegionOutput {
    dir: PathBuf,
    renderer: MarkdownRenderer,
}

impl RegionOutput {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            renderer: MarkdownRenderer::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn region_path(&self, region: Region) -> PathBuf {
        self.dir.join(format!("{}.html", region.as_str()))
    }

    /// Renders `canonical` and replaces the region's file with the result.
    pub fn render_into(&self, region: Region, canonical: &str) -> Result<PathBuf, OutputError> {
        let rendered = render_canonical(&self.renderer, canonical);
        if rendered.outcome == RenderOutcome::Fallback {
            console_debug!("Region {} written as preformatted text", region.as_str());
        }
        let document = html_document(region, &rendered.markup);
        self.write_atomic(&format!("{}.html", region.as_str()), &document)
    }

    pub fn write_summary(&self, highlights: &SummaryHighlights) -> Result<PathBuf, OutputError> {
        self.write_atomic(SUMMARY_FILE, &summary_text(highlights))
    }

    pub fn remove_summary(&self) -> Result<(), OutputError> {
        match fs::remove_file(self.dir.join(SUMMARY_FILE)) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }

    /// Puts every pane back to the placeholder and drops the summary, so
    /// nothing from an earlier run is left in the directory.
    pub fn clear(&self) -> Result<(), OutputError> {
        for region in Region::ALL {
            self.render_into(region, "")?;
        }
        self.remove_summary()
    }

    fn write_atomic(&self, filename: &str, content: &str) -> Result<PathBuf, OutputError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target).map_err(|e| OutputError::Io(e.error))?;
        Ok(target)
    }
}

fn html_document(region: Region, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n<section id=\"{id}\">\n{body}</section>\n</body>\n</html>\n",
        title = title(region),
        id = region.as_str(),
    )
}

fn title(region: Region) -> &'static str {
    match region {
        Region::Research => "Research",
        Region::Evaluation => "Evaluation",
        Region::Summary => "Summary",
        Region::Documentation => "Documentation",
    }
}

/// Plain-text rendering of the completion highlights.
pub fn summary_text(highlights: &SummaryHighlights) -> String {
    let mut out = String::new();
    if let Some(score) = &highlights.feasibility_score {
        out.push_str(&format!("Feasibility score: {score}\n"));
    }
    for (label, items) in [
        ("Value propositions", &highlights.value_propositions),
        ("Success factors", &highlights.success_factors),
    ] {
        if items.is_empty() {
            continue;
        }
        out.push_str(&format!("{label}:\n"));
        for item in items {
            out.push_str(&format!("- {item}\n"));
        }
    }
    if let Some(summary) = &highlights.raw_summary {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(summary.trim_end());
        out.push('\n');
    }
    out
}
