pub mod router;
pub mod types;
pub mod handlers {
    pub mod common;
    pub mod documents;
    pub mod health;
    pub mod session;
    pub mod sign;
    pub mod verify;
}

pub use router::{create_router, ApiDoc};
pub use types::AppState;
