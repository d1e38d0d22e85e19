pub mod health_checks;
pub mod ping;

pub use health_checks::*;
pub use ping::*;
