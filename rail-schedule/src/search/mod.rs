//! Station search: approximate index plus the search-box state machine.

mod index;
mod session;

pub use index::{FuzzyIndex, Match, MatchConfig, SearchKeys};
pub use session::{DEFAULT_MAX_MATCHES, SearchEvent, SearchPhase, SearchSession};
