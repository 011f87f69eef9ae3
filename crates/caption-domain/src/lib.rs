// caption-domain library entry point
pub mod caption;
pub mod error;
pub mod hashtags;
pub mod image;
pub mod platform;
pub mod schema;
pub use caption::CaptionResult;
pub use error::DomainError;
pub use hashtags::{AugmentedHashtags, MergeReport, HASHTAG_CAP};
pub use image::ImagePayload;
pub use platform::Platform;
pub use schema::{validate_generate_input, Schema, ValidationErrors, Violation};
