// src/extractors/mod.rs
pub mod classifier;
pub mod label;
pub mod noise;
pub mod record;
pub mod section;

// Re-export key extraction types for convenience
#[allow(unused_imports)]
pub use record::{build_record, ExtractedRecord, FieldExtractor};
#[allow(unused_imports)]
pub use label::extract_label;
#[allow(unused_imports)]
pub use section::extract_section;
#[allow(unused_imports)]
pub use noise::normalize;
