mod provider;
mod replay;
mod track;

pub use provider::{ProviderCall, SimulatedProvider, SimulationSettings};
pub use replay::replay;
pub use track::{Track, TrackError, TrackStep, load_track};
