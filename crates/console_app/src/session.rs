use std::io::Write;
use std::time::Duration;

use console_core::{update, AppState, Msg, SessionState};
use console_logging::{console_debug, console_info, get_render_tick, set_render_tick};

use crate::effects::EffectRunner;
use crate::output::OutputError;
use crate::present::Presenter;

/// Owns one session: the core state, the engine behind the effect runner,
/// and the presenter. All state changes happen on the calling thread.
pub struct SessionController<W: Write> {
    state: AppState,
    runner: EffectRunner,
    presenter: Presenter<W>,
    render_tick: Duration,
    tick: u64,
}

impl<W: Write> SessionController<W> {
    pub fn new(runner: EffectRunner, presenter: Presenter<W>, render_tick: Duration) -> Self {
        Self {
            state: AppState::new(),
            runner,
            presenter,
            render_tick,
            tick: 0,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Submits `user_input` as a new job, replacing any tracked one.
    pub fn start(&mut self, user_input: &str) -> Result<(), OutputError> {
        self.dispatch(Msg::InputChanged(user_input.to_string()))?;
        self.dispatch(Msg::SubmitClicked)
    }

    pub fn reset(&mut self) -> Result<(), OutputError> {
        self.dispatch(Msg::ResetClicked)
    }

    pub fn dispatch(&mut self, msg: Msg) -> Result<(), OutputError> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.runner.run(effects);
        let was_dirty = state.consume_dirty();
        let view = state.view();
        self.state = state;
        if was_dirty {
            self.presenter.present(&view)?;
        }
        Ok(())
    }

    /// Pumps engine events until nothing is in flight and every pane has
    /// caught up. Returns the final session state.
    pub fn run_until_settled(&mut self) -> Result<SessionState, OutputError> {
        while !self.state.is_settled() {
            self.tick += 1;
            set_render_tick(self.tick);
            let msg = self.runner.next_msg(self.render_tick).unwrap_or(Msg::Tick);
            self.dispatch(msg)?;
        }
        console_debug!("Session settled at tick {}", get_render_tick());
        Ok(self.state.session())
    }

    /// Ends tracking and returns the presenter's writer.
    pub fn dispose(self) -> W {
        console_info!("Disposing session in state {:?}", self.state.session());
        self.runner.stop();
        self.presenter.into_inner()
    }
}
