pub mod api;
pub mod client;
pub mod collection;
pub mod error;
pub mod fields;
pub mod http;
pub mod lifecycle;
pub mod model;
pub mod transport;

#[cfg(test)]
mod testing;

pub use client::{SpaceAction, SpaceClient};
pub use error::{ErrorCategory, Operation, Result, SpaceError, UpdateError};
pub use fields::Field;
pub use http::{ClientConfig, DEFAULT_BASE_URL, HttpTransport};
pub use lifecycle::{Change, SpaceController, plan};
pub use model::{CollectionKind, DesiredConfig, Entries, ObservedState, SpaceId};
pub use transport::{ApiRequest, ApiResponse, Method, Transport, TransportError, TransportErrorKind};
