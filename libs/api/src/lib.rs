pub mod codec;
pub mod error;
pub mod store;
pub mod transport;
pub mod types;
pub mod util;

pub use codec::{decode, encode};
pub use error::{CodecError, StoreError, TransportError};
pub use store::ReportStore;
pub use transport::{Inbound, Subscription, Transport};
pub use types::{ProbeMessage, ReportRecord};
pub use util::{env_or, now_micros};
