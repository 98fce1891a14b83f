//! HTTP API.
//!
//! | method | path                     |
//! |--------|--------------------------|
//! | GET    | `/`                      |
//! | GET    | `/health`                |
//! | POST   | `{api_prefix}/cluster`   |

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::{ApiError, ErrorBody};
pub use routes::create_router;
pub use state::{ApiConfig, AppState};
