//! End-to-end parse, normalize and filter over whole files.
use std::io::prelude::*;
use std::path;
use std::sync::Arc;

use log::info;

use crate::filters::{DeletionReport, FilterConfig, PeakFilterPipeline};
use crate::io::{open_file, BlockDelimiter, BlockLayout, BlockReader, SpectralFormat, SpectrumFileError};
use crate::normalize::Normalizer;
use crate::record::{CanonicalRecord, RawRecord};
use crate::reference::ReferenceData;
use crate::scheduler::{ChunkedScheduler, ProgressObserver, SchedulerConfig, SchedulerError};

#[cfg(feature = "json")]
use crate::io::json::{read_json_values, JSONRecordParser};

/// The label every stage reports its items under
pub const ITEM_TYPE: &str = "spectra";
pub const NORMALIZE_PREFIX: &str = "Normalizing spectrums:";
pub const FILTER_PREFIX: &str = "Filtering peaks:";

/// The surviving records of a run and the report of what was removed
#[derive(Debug, Default)]
pub struct PipelineOutput {
    /// Records that passed every stage, in input order
    pub records: Vec<CanonicalRecord>,
    /// Records removed by the peak filters
    pub deletions: DeletionReport,
    /// Input units that did not hold a spectrum at all
    pub unparsed: usize,
}

/**
Drives the [`ChunkedScheduler`] through each stage with shared, read-only reference data.

The same pipeline can be reused for any number of inputs. Each call gets its own
[`DeletionReport`].
*/
#[derive(Debug)]
pub struct SpectrumPipeline {
    reference: Arc<ReferenceData>,
    filters: PeakFilterPipeline,
    scheduler: ChunkedScheduler,
}

impl SpectrumPipeline {
    pub fn new(
        reference: Arc<ReferenceData>,
        filters: FilterConfig,
        scheduler: SchedulerConfig,
    ) -> Result<Self, SchedulerError> {
        Ok(Self {
            reference,
            filters: PeakFilterPipeline::new(filters),
            scheduler: ChunkedScheduler::new(scheduler)?,
        })
    }

    /// A pipeline over the built-in reference tables with the default filters
    pub fn builtin() -> Result<Self, SchedulerError> {
        Self::new(
            Arc::new(ReferenceData::builtin()),
            FilterConfig::default(),
            SchedulerConfig::default(),
        )
    }

    pub fn with_filters(mut self, config: FilterConfig) -> Self {
        self.filters = PeakFilterPipeline::new(config);
        self
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn filters(&self) -> &PeakFilterPipeline {
        &self.filters
    }

    pub fn scheduler(&self) -> &ChunkedScheduler {
        &self.scheduler
    }

    fn block_layout(format: SpectralFormat) -> Result<(BlockLayout, BlockDelimiter), SpectrumFileError> {
        match format {
            #[cfg(feature = "msp")]
            SpectralFormat::MSP => Ok((BlockLayout::MSP, BlockDelimiter::BlankLine)),
            #[cfg(feature = "mgf")]
            SpectralFormat::MGF => Ok((BlockLayout::MGF, BlockDelimiter::Ions)),
            other => Err(SpectrumFileError::UnsupportedFormat(other)),
        }
    }

    /// Parse unsplit record blocks of a text format
    pub fn parse_blocks<O: ProgressObserver + ?Sized>(
        &self,
        blocks: Vec<String>,
        format: SpectralFormat,
        observer: &O,
    ) -> Result<Vec<RawRecord>, SpectrumFileError> {
        let (layout, _) = Self::block_layout(format)?;
        Ok(self.scheduler.process(
            blocks,
            format.stage_prefix(),
            ITEM_TYPE,
            observer,
            |block| layout.parse_block(&block),
        ))
    }

    /// Split and parse the text of a whole MSP or MGF file
    pub fn parse_text<O: ProgressObserver + ?Sized>(
        &self,
        text: &str,
        format: SpectralFormat,
        observer: &O,
    ) -> Result<Vec<RawRecord>, SpectrumFileError> {
        let (_, delimiter) = Self::block_layout(format)?;
        let blocks = BlockReader::new(text.as_bytes(), delimiter).read_all()?;
        self.parse_blocks(blocks, format, observer)
    }

    #[cfg(feature = "json")]
    pub fn parse_json_values<O: ProgressObserver + ?Sized>(
        &self,
        values: Vec<serde_json::Value>,
        observer: &O,
    ) -> Vec<RawRecord> {
        let parser = JSONRecordParser::new();
        self.scheduler.process(
            values,
            SpectralFormat::JSON.stage_prefix(),
            ITEM_TYPE,
            observer,
            |value| parser.parse_value(&value),
        )
    }

    pub fn normalize_records<O: ProgressObserver + ?Sized>(
        &self,
        records: Vec<RawRecord>,
        observer: &O,
    ) -> Vec<CanonicalRecord> {
        let normalizer = Normalizer::new(&self.reference);
        self.scheduler
            .process(records, NORMALIZE_PREFIX, ITEM_TYPE, observer, |raw| {
                Some(normalizer.normalize(raw))
            })
    }

    /// Run the peak filters, pushing removed records to `report`
    pub fn filter_records<O: ProgressObserver + ?Sized>(
        &self,
        records: Vec<CanonicalRecord>,
        report: &DeletionReport,
        observer: &O,
    ) -> Vec<CanonicalRecord> {
        self.scheduler
            .process(records, FILTER_PREFIX, ITEM_TYPE, observer, |record| {
                self.filters.apply(record, report)
            })
    }

    /// Normalize and filter already parsed records
    pub fn process_raw<O: ProgressObserver + ?Sized>(
        &self,
        records: Vec<RawRecord>,
        observer: &O,
    ) -> PipelineOutput {
        let deletions = DeletionReport::new();
        let records = self.normalize_records(records, observer);
        let records = self.filter_records(records, &deletions, observer);
        info!(
            "{} spectra kept, {} deleted",
            records.len(),
            deletions.len()
        );
        PipelineOutput {
            records,
            deletions,
            unparsed: 0,
        }
    }

    /// Run every stage over the text of a whole MSP or MGF file
    pub fn process_text<O: ProgressObserver + ?Sized>(
        &self,
        text: &str,
        format: SpectralFormat,
        observer: &O,
    ) -> Result<PipelineOutput, SpectrumFileError> {
        self.process_reader(text.as_bytes(), format, observer)
    }

    /// Run every stage over a stream holding a file of the given format
    pub fn process_reader<R: BufRead, O: ProgressObserver + ?Sized>(
        &self,
        reader: R,
        format: SpectralFormat,
        observer: &O,
    ) -> Result<PipelineOutput, SpectrumFileError> {
        let (raw, total) = match format {
            #[cfg(feature = "json")]
            SpectralFormat::JSON => {
                let values = read_json_values(reader)?;
                let total = values.len();
                (self.parse_json_values(values, observer), total)
            }
            _ => {
                let (_, delimiter) = Self::block_layout(format)?;
                let blocks = BlockReader::new(reader, delimiter).read_all()?;
                let total = blocks.len();
                (self.parse_blocks(blocks, format, observer)?, total)
            }
        };
        let unparsed = total - raw.len();
        let mut output = self.process_raw(raw, observer);
        output.unparsed = unparsed;
        Ok(output)
    }

    /// Infer the format of the file at `path`, then run every stage over it
    pub fn process_path<P: Into<path::PathBuf>, O: ProgressObserver + ?Sized>(
        &self,
        path: P,
        observer: &O,
    ) -> Result<PipelineOutput, SpectrumFileError> {
        let path = path.into();
        let (format, reader) = open_file(path.clone())?;
        info!("Reading {} as {format}", path.display());
        self.process_reader(reader, format, observer)
    }
}

#[cfg(test)]
mod test {
    use std::sync::mpsc::channel;

    use super::*;
    use crate::filters::DeletionReason;
    use crate::record::{CanonicalKey, Peak};
    use crate::scheduler::{NoProgress, ProgressEvent};

    fn pipeline(filters: FilterConfig) -> SpectrumPipeline {
        SpectrumPipeline::new(
            Arc::new(ReferenceData::builtin()),
            filters,
            SchedulerConfig {
                chunk_size: Some(2),
                threads: Some(2),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test_log::test]
    fn test_msp_precursor_filter() {
        let pipeline = pipeline(FilterConfig {
            remove_peaks_above_precursor_mz: true,
            ..FilterConfig::disabled()
        });
        let output = pipeline
            .process_text(
                "NAME: Test\nPRECURSORMZ: 100.0\n50.0 10\n150.0 20\n",
                SpectralFormat::MSP,
                &NoProgress,
            )
            .unwrap();
        assert_eq!(output.records.len(), 1);
        assert_eq!(output.records[0].peaks, vec![Peak::new(50.0, 10.0)]);
        assert_eq!(output.records[0].text(CanonicalKey::Name), Some("Test"));
        assert!(output.deletions.is_empty());
    }

    #[test_log::test]
    fn test_process_msp_file() {
        let pipeline = pipeline(FilterConfig::default());
        let (sender, receiver) = channel();
        let output = pipeline
            .process_path("./test/data/small.msp", &sender)
            .unwrap();
        drop(sender);

        // The third spectrum only has peaks above its precursor
        assert_eq!(output.records.len(), 2);
        assert_eq!(output.deletions.len(), 1);
        assert_eq!(output.deletions.count(DeletionReason::AllAbovePrecursor), 1);
        assert_eq!(output.unparsed, 0);

        let caffeine = &output.records[0];
        assert_eq!(caffeine.text(CanonicalKey::Name), Some("Caffeine"));
        assert_eq!(caffeine.text(CanonicalKey::PrecursorType), Some("[M+H]+"));
        assert_eq!(caffeine.text(CanonicalKey::IonMode), Some("positive"));
        assert_eq!(caffeine.text(CanonicalKey::InstrumentType), Some("LC-ESI-QTOF"));
        assert_eq!(caffeine.text(CanonicalKey::Smiles), None);
        let max = caffeine.peaks.iter().map(|p| p.intensity).fold(0.0, f64::max);
        assert_eq!(max, 100.0);

        let prefixes: Vec<_> = receiver
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::StagePrefix(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(
            prefixes,
            vec![
                "Parsing MSP spectrums:",
                "Normalizing spectrums:",
                "Filtering peaks:"
            ]
        );
    }

    #[test_log::test]
    fn test_process_mgf_file() {
        let pipeline = pipeline(FilterConfig::disabled());
        let output = pipeline.process_path("./test/data/small.mgf", &NoProgress).unwrap();
        assert_eq!(output.records.len(), 2);
        assert_eq!(output.unparsed, 0);
        let glucose = &output.records[0];
        assert_eq!(glucose.text(CanonicalKey::Name), Some("Glucose"));
        assert_eq!(glucose.precursor_mz(), Some(203.0526));
        assert_eq!(glucose.text(CanonicalKey::RetentionTime), Some("5"));
        assert_eq!(glucose.text(CanonicalKey::PrecursorType), Some("[M+Na]+"));
    }

    #[cfg(feature = "json")]
    #[test_log::test]
    fn test_process_json_file() {
        let pipeline = pipeline(FilterConfig::disabled());
        let output = pipeline.process_path("./test/data/mona.json", &NoProgress).unwrap();
        assert_eq!(output.records.len(), 2);
        let first = &output.records[0];
        assert_eq!(first.text(CanonicalKey::Name), Some("Caffeine"));
        assert_eq!(first.text(CanonicalKey::Predicted), Some("false"));
        assert_eq!(first.text(CanonicalKey::MsLevel), Some("2"));
        assert_eq!(output.records[1].text(CanonicalKey::Predicted), Some("true"));
    }

    #[test]
    fn test_unknown_format() {
        let pipeline = pipeline(FilterConfig::default());
        assert!(matches!(
            pipeline.process_text("", SpectralFormat::Unknown, &NoProgress),
            Err(SpectrumFileError::UnsupportedFormat(SpectralFormat::Unknown))
        ));
    }
}
