pub mod registry;

pub use registry::{Adapter, AdapterManifest, AdapterRegistry};
