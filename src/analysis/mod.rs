mod image;
mod service;
mod session;
mod tasks;

pub use image::{ImageFormat, ImagePayload};
pub use service::Analyzer;
pub use session::SessionPreference;
pub use tasks::AnalysisTask;
