pub mod error;
pub mod listener;
pub mod names;
pub mod publisher;
pub mod report;
pub mod session;

pub use error::ProbeError;
pub use names::NameGenerator;
pub use report::{LatencyReport, aggregate};
pub use session::Session;
