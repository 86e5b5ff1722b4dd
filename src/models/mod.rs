pub mod availability;

// Re-exports for convenience
pub use availability::*;
