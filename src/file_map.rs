use indicatif::ProgressBar;

use crate::block_source::{BlockSource, Extraction};
use crate::error::MapError;
use crate::executor::ForkJoin;
use crate::shared_types::{Cutoff, PartialSum, UnitRange};

/// Cutoff-gated divide and conquer over the blocks of a [`BlockSource`].
///
/// Ranges longer than the cutoff are halved and both halves are handed to the
/// executor; shorter ones are summed in place. Sums wrap on overflow, so the
/// result does not depend on where the splits fell.
pub(crate) struct FileMap<'a, S: ?Sized, E> {
    source: &'a S,
    executor: &'a E,
    cutoff: Cutoff,
    extraction: Extraction,
    progress: Option<ProgressBar>,
}

impl<'a, S, E> FileMap<'a, S, E>
where
    S: BlockSource + ?Sized,
    E: ForkJoin,
{
    pub(crate) fn new(source: &'a S, executor: &'a E, cutoff: Cutoff) -> Self {
        Self {
            source,
            executor,
            cutoff,
            extraction: Extraction::default(),
            progress: None,
        }
    }

    pub(crate) fn with_extraction(mut self, extraction: Extraction) -> Self {
        self.extraction = extraction;
        self
    }

    pub(crate) fn with_progress(mut self, progress: Option<ProgressBar>) -> Self {
        self.progress = progress;
        self
    }

    pub(crate) fn process(&self, range: UnitRange) -> Result<PartialSum, MapError> {
        if range.is_empty() {
            return Ok(0);
        }
        // A single unit cannot be split any further, whatever the cutoff says.
        if range.len() <= self.cutoff.max(1) {
            return self.process_leaf(range);
        }

        let (left, right) = range.split();
        let (left_sum, right_sum) = self
            .executor
            .fork_join(|| self.process(left), || self.process(right));
        // Left first, so a failure reports the lowest failing unit.
        Ok(left_sum?.wrapping_add(right_sum?))
    }

    pub(crate) fn process_leaf(&self, range: UnitRange) -> Result<PartialSum, MapError> {
        let mut sum: PartialSum = 0;
        for unit in range.units() {
            let block = self.source.read_block(unit)?;
            sum = sum.wrapping_add(self.extraction.extract(&block));
        }
        if let Some(progress) = &self.progress {
            progress.inc(range.len());
        }
        Ok(sum)
    }
}
