//! Text normalization for scraped titles and definitions
//!
//! Every function here is pure: raw scraped strings go in, canonical
//! deduplicated sets come out. The pipeline is split into steps so each can
//! be exercised on its own:
//!
//! fold whitespace -> strip `[...]` -> strip `(...)` -> split on `", "` ->
//! clean segments -> dedupe

mod normalize;

pub use normalize::{
    clean_segment, fold_whitespace, normalize_definition, normalize_title, split_segments,
    strip_enclosed, SEGMENT_SEPARATOR,
};
