//! Typewriter-style progressive reveal of growing pane content.
//!
//! Time is external: the caller schedules one `tick` per `REVEAL_INTERVAL`
//! while `tick` returns `RevealStep::Continue`. Each tick re-reads the
//! current content length, so growth that lands mid-reveal is never lost.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::Region;

pub const REVEAL_CHUNK_CHARS: usize = 10;
pub const REVEAL_INTERVAL: Duration = Duration::from_millis(20);
pub const CURSOR_GLYPH: char = '\u{258B}';

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct RegionReveal {
    full_content: String,
    /// Counted in chars, not bytes.
    displayed_len: usize,
    revealing: bool,
}

impl RegionReveal {
    fn total_chars(&self) -> usize {
        self.full_content.chars().count()
    }

    fn displayed(&self) -> &str {
        let end = self
            .full_content
            .char_indices()
            .nth(self.displayed_len)
            .map_or(self.full_content.len(), |(idx, _)| idx);
        &self.full_content[..end]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStep {
    /// No loop is running for this region.
    Idle,
    /// More content remains; schedule another tick.
    Continue,
    /// Caught up with the current content; the loop has stopped.
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncrementalWriter {
    regions: BTreeMap<Region, RegionReveal>,
    chunk_chars: usize,
}

impl Default for IncrementalWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl IncrementalWriter {
    pub fn new() -> Self {
        Self::with_chunk(REVEAL_CHUNK_CHARS)
    }

    pub fn with_chunk(chunk_chars: usize) -> Self {
        Self {
            regions: BTreeMap::new(),
            chunk_chars: chunk_chars.max(1),
        }
    }

    /// Sets the region's target content. Returns `true` when no loop was
    /// running and the caller must schedule the first tick.
    pub fn reveal(&mut self, region: Region, latest: &str) -> bool {
        let state = self.regions.entry(region).or_default();
        // Keep the on-screen text the new content still starts with; a
        // trailing blank line overwritten by growth only costs those chars.
        state.displayed_len = common_prefix_chars(state.displayed(), latest);
        state.full_content = latest.to_string();
        if state.revealing {
            false
        } else {
            state.revealing = true;
            true
        }
    }

    pub fn tick(&mut self, region: Region) -> RevealStep {
        let chunk = self.chunk_chars;
        let Some(state) = self.regions.get_mut(&region) else {
            return RevealStep::Idle;
        };
        if !state.revealing {
            return RevealStep::Idle;
        }
        let total = state.total_chars();
        state.displayed_len = (state.displayed_len + chunk).min(total);
        if state.displayed_len < total {
            RevealStep::Continue
        } else {
            state.revealing = false;
            RevealStep::Finished
        }
    }

    /// Text currently on screen, with the cursor glyph while catching up.
    pub fn visible_text(&self, region: Region) -> String {
        let Some(state) = self.regions.get(&region) else {
            return String::new();
        };
        let mut text = state.displayed().to_string();
        if state.revealing && state.displayed_len < state.total_chars() {
            text.push(CURSOR_GLYPH);
        }
        text
    }

    pub fn displayed_len(&self, region: Region) -> usize {
        self.regions.get(&region).map_or(0, |state| state.displayed_len)
    }

    pub fn full_content(&self, region: Region) -> Option<&str> {
        self.regions
            .get(&region)
            .map(|state| state.full_content.as_str())
    }

    pub fn is_revealing(&self, region: Region) -> bool {
        self.regions.get(&region).is_some_and(|state| state.revealing)
    }

    pub fn is_idle(&self) -> bool {
        !self.regions.values().any(|state| state.revealing)
    }

    pub fn reset(&mut self) {
        self.regions.clear();
    }
}

fn common_prefix_chars(shown: &str, latest: &str) -> usize {
    shown
        .chars()
        .zip(latest.chars())
        .take_while(|(a, b)| a == b)
        .count()
}
