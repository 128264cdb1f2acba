//! HTTP middleware for the catalog API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. CORS
//! 3. `TraceLayer` (`http_request` span)
//! 4. Request ID (recorded on the span, echoed in the response)
//!
//! `RequestOrigin` is an extractor rather than a layer; only the upload
//! handlers need it.

pub mod origin;
pub mod request_id;

pub use origin::RequestOrigin;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
