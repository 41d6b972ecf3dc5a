pub mod propertydata;
pub mod synthetic;
pub mod traits;
pub mod transform;
pub mod types;

pub use propertydata::PropertyDataClient;
pub use traits::PropertyProvider;
pub use transform::transform;
pub use types::ProviderPayload;
