//! Request handlers.
//!
//! Handlers extract the caller via [`AuthUser`](crate::middleware::auth::AuthUser),
//! delegate to the service functions in `microwins_core`, and wrap results
//! in [`DataResponse`](crate::response::DataResponse).

pub mod profile;
pub mod stats;
pub mod tasks;
