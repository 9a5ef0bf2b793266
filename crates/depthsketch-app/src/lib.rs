//! DepthSketch Application
//!
//! Headless application shell: replays recorded input sessions against the
//! canvas and reports the resulting layer and object panels.

mod action;
mod error;
mod report;
mod session;
mod shortcuts;

pub use action::{UiAction, apply_action};
pub use error::{AppError, AppResult};
pub use report::{LayerSummary, Summary, layer_panel, object_panel};
pub use session::{Session, SessionEvent, apply_event};
pub use shortcuts::{Shortcut, ShortcutRegistry};
