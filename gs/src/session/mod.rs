//! Studio session: state machine, chat routing and outcomes

mod controller;
pub mod intent;
mod state;

pub use controller::SessionController;
pub use intent::{IMAGE_KEYWORDS, Intent};
pub use state::{BusyFlags, ChatOutcome, Detection, SessionError, StudioInputs, View};
