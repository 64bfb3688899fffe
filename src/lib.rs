//! `fraghub` reads mass spectral library records from heterogeneous text formats
//! (MSP, MGF and MoNA-style JSON), maps their metadata onto one canonical schema, and
//! runs a fixed pipeline of peak list filters over them.
//!
//! The stages are:
//! 1. [`io`] splits files into record blocks and parses each into a [`RawRecord`]
//! 2. [`normalize`] maps free-form field names and values onto [`CanonicalKey`]
//! 3. [`filters`] applies the [`PeakFilterPipeline`], recording removed spectra in a
//!    [`DeletionReport`]
//!
//! [`scheduler`] drives the stages over large collections in memory-bounded chunks, and
//! [`pipeline`] ties everything together for a file on disk.
//!
//! ```no_run
//! use fraghub::prelude::*;
//!
//! let pipeline = SpectrumPipeline::builtin().unwrap();
//! let output = pipeline.process_path("library.msp", &LogProgress::default()).unwrap();
//! println!("{} spectra kept, {} deleted", output.records.len(), output.deletions.len());
//! ```
pub mod filters;
pub mod io;
pub mod normalize;
pub mod patterns;
pub mod pipeline;
pub mod prelude;
pub mod record;
pub mod reference;
pub mod scheduler;

pub use crate::record::{
    CanonicalKey, CanonicalRecord, FieldValue, IonMode, Peak, PeakList, RawRecord,
};

pub use crate::filters::{
    DeletionReason, DeletionRecord, DeletionReport, FilterConfig, PeakFilterPipeline,
};
pub use crate::normalize::Normalizer;
pub use crate::reference::ReferenceData;
pub use crate::scheduler::{ChunkedScheduler, ChunkingPlan, ProgressEvent, ProgressObserver};

pub use crate::io::{SpectralFormat, SpectrumFileError};
#[cfg(feature = "mgf")]
pub use crate::io::mgf::MGFReader;
#[cfg(feature = "msp")]
pub use crate::io::msp::MSPReader;

pub use crate::pipeline::{PipelineOutput, SpectrumPipeline};
