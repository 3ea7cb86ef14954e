// Panorama engine - size selection, prompt handling, segment requests and the pipeline

mod pipeline;
mod prompt;
mod requester;
mod size;
mod types;

pub use pipeline::{Collaborators, PanoramaPipeline};
pub use prompt::{build_full_prompt, is_english, segment_prompt};
pub use requester::SegmentRequester;
pub use size::{SizeDescriptor, select_size};
pub use types::{DataUri, PanoramaRequest, PanoramaResult};
