mod request;
mod response;

pub use request::ProcessForm;
pub use response::{ConfigDefaults, ConfigResponse, HealthResponse, ProcessResponse};
