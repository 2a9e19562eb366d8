//! pm-console: terminal front end for the product-analysis pipeline.
pub mod config;
pub mod effects;
pub mod kb;
pub mod logging;
pub mod output;
pub mod present;
pub mod session;

pub use config::{ConfigError, ConfigOverrides, ConsoleConfig};
pub use effects::EffectRunner;
pub use output::{OutputError, RegionOutput};
pub use present::Presenter;
pub use session::SessionController;
