pub mod archive;
pub mod duplicate_index;
pub mod image_loader;
pub mod pipeline;

pub use archive::{Archive, RecordSequence, StoreOutcome, VerifyReport};
pub use duplicate_index::{DuplicateIndex, DuplicateMatch, INDEX_FILE_NAME};
pub use image_loader::{list_images, ImageLoader, SourceImage, SUPPORTED_EXTENSIONS};
pub use pipeline::{
    check_image, BatchReport, CheckResult, Comparison, ImageOutcome, ImageReport, Pipeline,
    PreparedImage, QuantizeReport, DEFAULT_THRESHOLD,
};
