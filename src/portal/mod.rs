//! Portal client module for REST communication

mod client;
pub mod envelope;
mod error;
mod payload;
mod traits;

pub use client::PortalClient;
pub use error::{PortalError, PortalResult};
pub use payload::{
    DocumentsPayload, EncodedPhoto, EstimationLinesPayload, SurveyUpdatePayload,
};
pub use traits::PortalApi;

#[cfg(test)]
pub use traits::MockPortalApi;
