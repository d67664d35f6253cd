pub mod ambient;
pub mod features;
pub mod normalize;
pub mod provider;
pub mod resolve;

pub use ambient::synthesize_ambient;
pub use features::{
    Beat, Interval, NormalizedSignal, RawSignal, Segment, TrackAnalysis, TrackFeatures, PITCH_BANDS,
};
pub use normalize::normalize;
pub use resolve::{find_interval, resolve_signal};
