pub use crate::filters::{DeletionReport, PeakFilterPipeline};
pub use crate::io::{RecordParser, SpectralFormat};
pub use crate::normalize::Normalizer;
pub use crate::pipeline::{PipelineOutput, SpectrumPipeline};
pub use crate::record::{CanonicalKey, CanonicalRecord, FieldValue, Peak, RawRecord};
pub use crate::reference::InstrumentClassifier;
pub use crate::scheduler::{
    ApproximateSize, LogProgress, NoProgress, ProgressEvent, ProgressObserver,
};
pub use std::io::prelude::*;
