//! Endpoint synthesis: descriptors registered at runtime from catalog metadata.

pub mod registry;
pub mod synthesizer;

pub use registry::{EndpointDescriptor, EndpointHandler, RouteRegistry, ADMIN_PERMISSION, RESERVED_SEGMENTS};
pub use synthesizer::{EndpointSynthesizer, RegistrationReport, RegistrationState};
