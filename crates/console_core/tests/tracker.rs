use console_core::{
    ExecutionTracker, FinalResult, JobStatus, JobUpdate, NodeState, Region, RenderableContent,
    Step, StepEntry,
};
use pretty_assertions::assert_eq;

fn running(current: &str, steps: &[(&str, &str)]) -> JobUpdate {
    JobUpdate {
        current_step: Some(current.to_string()),
        steps: steps
            .iter()
            .map(|(step, message)| StepEntry::new(*step, *message))
            .collect(),
        status: Some(JobStatus::Running),
        ..JobUpdate::default()
    }
}

fn node(tracker: &ExecutionTracker, step: Step) -> NodeState {
    tracker
        .node_states()
        .into_iter()
        .find(|(candidate, _)| *candidate == step)
        .map(|(_, state)| state)
        .unwrap()
}

#[test]
fn step_log_is_concatenation_of_new_entries() {
    let mut tracker = ExecutionTracker::new("job-1");
    let first = tracker.apply(running("research", &[("research", "Executing research")]));
    assert_eq!(first.new_entries, vec![StepEntry::new("research", "Executing research")]);

    // Same snapshot again: nothing new.
    let repeat = tracker.apply(running("research", &[("research", "Executing research")]));
    assert!(repeat.new_entries.is_empty());

    let second = tracker.apply(running(
        "research",
        &[
            ("research", "Executing research"),
            ("research", "Research completed"),
            ("evaluation", "Evaluating"),
        ],
    ));
    assert_eq!(second.new_entries.len(), 2);

    let mut done = running(
        "finished",
        &[
            ("research", "Executing research"),
            ("research", "Research completed"),
            ("evaluation", "Evaluating"),
            ("finished", "All steps completed"),
        ],
    );
    done.status = Some(JobStatus::Completed);
    let last = tracker.apply(done);
    assert_eq!(last.terminal, Some(JobStatus::Completed));

    let messages: Vec<_> = tracker.step_log().iter().map(|e| e.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "Executing research",
            "Research completed",
            "Evaluating",
            "All steps completed"
        ]
    );
}

#[test]
fn error_latches_the_tracker() {
    let mut tracker = ExecutionTracker::new("job-1");
    tracker.apply(running("research", &[("research", "go")]));
    let applied = tracker.apply(JobUpdate {
        status: Some(JobStatus::Error),
        error: Some("LLM quota exhausted".to_string()),
        ..JobUpdate::default()
    });
    assert_eq!(applied.terminal, Some(JobStatus::Error));
    assert_eq!(tracker.error(), Some("LLM quota exhausted"));
    assert!(tracker.is_latched());

    let snapshot = tracker.clone();
    let ignored = tracker.apply(running("evaluation", &[("research", "go"), ("evaluation", "x")]));
    assert_eq!(ignored.new_entries.len(), 0);
    assert_eq!(tracker, snapshot);
}

#[test]
fn error_without_message_uses_generic_text() {
    let mut tracker = ExecutionTracker::new("job-1");
    tracker.apply(JobUpdate {
        status: Some(JobStatus::Error),
        ..JobUpdate::default()
    });
    assert_eq!(tracker.error(), Some("Unknown error"));
    assert_eq!(tracker.status(), JobStatus::Error);
}

#[test]
fn partial_results_survive_updates_that_omit_them() {
    let mut tracker = ExecutionTracker::new("job-1");
    let mut update = running("research", &[]);
    update.partials = vec![(Region::Research, RenderableContent::text("# Findings"))];
    let applied = tracker.apply(update);
    assert_eq!(applied.changed_regions, vec![Region::Research]);

    let applied = tracker.apply(running("evaluation", &[]));
    assert!(applied.changed_regions.is_empty());
    assert_eq!(
        tracker.partial(Region::Research),
        Some(&RenderableContent::text("# Findings"))
    );
}

#[test]
fn unknown_steps_are_logged_but_not_highlighted() {
    let mut tracker = ExecutionTracker::new("job-1");
    let applied = tracker.apply(running("market_scan", &[("market_scan", "Scanning")]));
    assert_eq!(applied.new_entries, vec![StepEntry::new("market_scan", "Scanning")]);
    assert_eq!(tracker.current_step(), Some("market_scan"));
    for step in Step::NODES {
        assert_eq!(node(&tracker, step), NodeState::Waiting);
    }
}

#[test]
fn node_states_follow_current_step_and_log() {
    let mut tracker = ExecutionTracker::new("job-1");
    tracker.apply(running("research", &[("research", "Starting analysis")]));
    assert_eq!(node(&tracker, Step::Research), NodeState::Active);

    tracker.apply(running(
        "evaluation",
        &[("research", "Starting analysis"), ("evaluation", "Evaluating")],
    ));
    assert_eq!(node(&tracker, Step::Research), NodeState::Completed);
    assert_eq!(node(&tracker, Step::Evaluation), NodeState::Active);
    assert_eq!(node(&tracker, Step::Documentation), NodeState::Waiting);

    tracker.apply(JobUpdate {
        error: Some("boom".to_string()),
        ..JobUpdate::default()
    });
    assert_eq!(node(&tracker, Step::Evaluation), NodeState::Failed);
    assert_eq!(node(&tracker, Step::Research), NodeState::Completed);
}

#[test]
fn status_never_regresses_to_pending() {
    let mut tracker = ExecutionTracker::new("job-1");
    tracker.apply(running("research", &[]));
    tracker.apply(JobUpdate {
        status: Some(JobStatus::Pending),
        ..JobUpdate::default()
    });
    assert_eq!(tracker.status(), JobStatus::Running);
}

#[test]
fn final_result_is_handed_out_once() {
    let mut tracker = ExecutionTracker::new("job-1");
    tracker.apply(JobUpdate {
        status: Some(JobStatus::Completed),
        done: true,
        ..JobUpdate::default()
    });
    assert_eq!(tracker.take_finalization(), None);

    let result = FinalResult {
        summary: Some(RenderableContent::text("done")),
        ..FinalResult::default()
    };
    tracker.record_final_result(result.clone());
    assert_eq!(tracker.take_finalization(), Some(result));
    assert_eq!(tracker.take_finalization(), None);
    assert!(tracker.is_finalized());
    for step in Step::NODES {
        assert_eq!(node(&tracker, step), NodeState::Completed);
    }
}
