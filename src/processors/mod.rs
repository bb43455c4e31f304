//! Markdown processing pipeline: segment, index, translate in chunks, reassemble

pub mod batch;
pub mod index;
pub mod markdown;
pub mod reassemble;
pub mod segment;
