//! Image transformation pipeline components.
//!
//! This module contains all the stages a transformation runs through:
//! - **request**: Request and plan types, output formats
//! - **validate**: Request validation, before any retrieval
//! - **decode**: Content-sniffed decoding with dimension limits
//! - **geometry**: Resize, crop and rotate stages
//! - **filter**: Grayscale and sepia stages
//! - **apply**: Fixed-order stage composition
//! - **encode**: Output container encoding
//! - **processor**: Decode, apply and encode on a blocking worker

pub mod apply;
pub mod decode;
pub mod encode;
pub mod filter;
pub mod geometry;
pub mod processor;
pub mod request;
pub mod validate;

// Re-exports for convenient access
pub use apply::apply;
pub use decode::{DecodedImage, ImageDecoder};
pub use encode::ImageEncoder;
pub use filter::SepiaParams;
pub use processor::TransformProcessor;
pub use request::{
    CropOptions, FilterOptions, OutputFormat, ResizeOptions, Rotation, TransformPlan,
    TransformationRequest,
};
pub use validate::RequestValidator;
