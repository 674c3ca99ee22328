//! Domain types for the schedule viewer.
//!
//! Stations, upcoming-train rows and per-train journeys, as delivered by the
//! remote schedule source. Code types enforce their invariants at
//! construction time, so code that receives them can trust their validity.

mod journey;
mod station;
mod train;
mod train_code;

pub use journey::{Journey, JourneyStop, LocationKind, StopMarker};
pub use station::{InvalidStationCode, Station, StationCode};
pub use train::{Direction, Train};
pub use train_code::{InvalidTrainCode, TrainCode};
