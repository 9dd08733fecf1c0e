pub mod config;
pub mod image;
pub mod section;

pub use config::{parse_factor, AppConfig, FailurePolicy, RemainderPolicy};
pub use image::{Block, Image, PixelFormat};
pub use section::SectionId;
