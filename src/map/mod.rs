//! Map export - brush-based `.map` text for TrenchBroom-style editors

mod config;
mod export;

pub use config::ExportConfig;
pub use export::export;
