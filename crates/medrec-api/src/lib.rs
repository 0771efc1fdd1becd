//! HTTP API for MedRec.
//!
//! ## Endpoints
//!
//! - `GET /` - Liveness message
//! - `POST /api/predict` - Symptoms → disease with reference and generated advice
//! - `POST /api/interactions` - Drug list → pairwise interaction report
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use medrec_api::{AppContext, create_router};
//!
//! let ctx = Arc::new(AppContext::new(references, Box::new(classifier), enricher));
//! let router = create_router(ctx, HeaderValue::from_static("http://localhost:3000"));
//! ```

mod error;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppContext;
