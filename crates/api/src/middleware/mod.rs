//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction capture)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded on the span, echoed in the response)
//! 4. CORS (any origin, as the browser clients are served elsewhere)
//! 5. Body limit (uploads capped at `MAX_UPLOAD_BYTES`)
//!
//! Authentication is an extractor ([`RequireAuth`]) rather than a layer so
//! public routes share the same router.

pub mod auth;
pub mod request_id;

pub use auth::RequireAuth;
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
