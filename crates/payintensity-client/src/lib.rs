pub mod commands;
pub mod contracts;
pub mod derive;
pub mod error;
pub mod load;
pub mod publish;
pub mod reference;

pub use contracts::envelope::{FailureEnvelope, SuccessEnvelope};
pub use error::{ClientError, ClientResult};

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");
