mod error;
mod service;

pub use error::{PictureError, PictureOutcome};
pub use service::PictureService;
