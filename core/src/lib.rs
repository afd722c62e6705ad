pub mod params;
pub mod target;
pub mod form;

pub use form::{ChangeKind, FormConfig, FormError, FormSynchronizer, RenderReport};
pub use params::{ParamKind, ParamValue, ParameterDefinition, StoredParams, ValueMapping};
pub use target::{RenderTarget, VirtualTree};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
