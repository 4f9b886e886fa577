pub mod router;

pub use router::{resolve_seed, Router, RouterPolicy};
