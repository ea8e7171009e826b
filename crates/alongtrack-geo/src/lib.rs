//! Track geometry for AlongTrack
//!
//! Cumulative distances, interpolation and projection of POIs onto a track,
//! plus partitioning of the track into query windows.

pub mod mercator;
pub mod projector;
pub mod track;
pub mod windows;

pub use projector::TrackProjector;
pub use track::{NearestPoint, TrackModel};
pub use windows::{Batch, QueryWindow, QueryWindower, MAX_WINDOWS};
