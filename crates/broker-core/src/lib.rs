//! Session state machine, codec, and registry shared by the broker's HTTP
//! surface and its client helpers.

pub mod codec;
pub mod error;
pub mod model;
pub mod registry;
pub mod session;
pub mod slot;

pub use error::{BrokerError, BrokerResult};
pub use model::{ClientVars, SessionData, SessionId, Status};
pub use registry::Registry;
pub use session::{EndOutcome, Session};
