pub mod candidate;
pub mod filter;
pub mod job;
pub mod poi;
pub mod track;

pub use candidate::{Candidate, Tags};
pub use filter::{Filter, FilterSet};
pub use job::{Job, JobArtifacts, JobId, JobState, JobSummary};
pub use poi::ResolvedPoi;
pub use track::TrackPoint;
