//! External service integrations.

pub mod services {
    pub use crate::services::*;
}

pub mod insights_models {
    pub use crate::insights_models::*;
}
