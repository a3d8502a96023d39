// Domain-layer modules and shared errors/models
pub mod transform {
    pub use crate::transform::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
