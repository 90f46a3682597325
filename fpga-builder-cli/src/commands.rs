pub mod confirm;
pub mod output;
pub mod repo;
pub mod run;
pub mod toolchain;

// Re-export all command functions for easier access
pub use confirm::*;
pub use output::*;
pub use repo::*;
pub use run::*;
pub use toolchain::*;
