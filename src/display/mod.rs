// Display side of the event channel: the sink contract and a headless implementation.

pub mod sink;
pub mod transcript;

pub use sink::{dispatch, drain, DisplaySink};
pub use transcript::Transcript;
