use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use indicatif::MultiProgress;

use crate::block_source::{BlockSource, Extraction, FileBlocks};
use crate::error::MapError;
use crate::executor::{ForkJoin, RayonExecutor, SequentialExecutor};
use crate::file_map::FileMap;
use crate::input_file::{file_size, open_input_file, whole_blocks, write_blocks};
use crate::progress_reporter::ProgressReporter;
use crate::shared_types::{Cutoff, PartialSum, UnitRange};

/// Everything a run needs besides `n` and the cutoff.
#[derive(Debug, Clone)]
pub(crate) struct RunSettings {
    pub(crate) input: PathBuf,
    pub(crate) create_input: bool,
    pub(crate) keep_input: bool,
    pub(crate) threads: Option<usize>,
    pub(crate) sequential: bool,
    pub(crate) extraction: Extraction,
    pub(crate) show_progress: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            input: PathBuf::from("input.dat"),
            create_input: true,
            keep_input: false,
            threads: None,
            sequential: false,
            extraction: Extraction::default(),
            show_progress: false,
        }
    }
}

/// State shared by the four benchmark phases, called in order:
/// `init`, `run`, `output`, `destroy`.
#[derive(Debug)]
pub(crate) struct BenchContext {
    pub(crate) n: u64,
    pub(crate) cutoff: Cutoff,
    pub(crate) result: Option<PartialSum>,
    pub(crate) elapsed: Option<Duration>,
    settings: RunSettings,
    created_input: bool,
}

impl BenchContext {
    pub(crate) fn new(n: u64, cutoff: Cutoff, settings: RunSettings) -> Self {
        Self {
            n,
            cutoff,
            result: None,
            elapsed: None,
            settings,
            created_input: false,
        }
    }

    pub(crate) fn init(&mut self) -> Result<(), MapError> {
        if self.settings.create_input {
            let file = open_input_file(&self.settings.input)?;
            // Ours from here on, so a failed write still gets cleaned up.
            self.created_input = true;
            write_blocks(file, &self.settings.input, self.n)?;
        }
        Ok(())
    }

    /// Runs all four phases. `destroy` always runs; the first error wins.
    pub(crate) fn launch(
        &mut self,
        multi: &MultiProgress,
        out: &mut impl Write,
    ) -> Result<(), MapError> {
        let outcome = self
            .init()
            .and_then(|()| self.run(multi))
            .and_then(|()| self.output(out).map_err(MapError::Report));
        self.destroy();
        outcome
    }

    /// Maps the whole file. Only the partitioning itself is timed.
    pub(crate) fn run(&mut self, multi: &MultiProgress) -> Result<(), MapError> {
        let blocks = FileBlocks::open(&self.settings.input)?;
        let size = file_size(&self.settings.input)?;
        info!(
            "mapping {} ({} bytes, {} blocks) with n = {}, cutoff = {}",
            self.settings.input.display(),
            size,
            whole_blocks(size),
            self.n,
            self.cutoff
        );
        if whole_blocks(size) < self.n {
            warn!(
                "input holds {} blocks but n = {}; expect a short read",
                whole_blocks(size),
                self.n
            );
        }

        let range = UnitRange::new(0, self.n)?;
        let reporter = ProgressReporter::new(self.n, multi, self.settings.show_progress);
        let outcome = if self.settings.sequential {
            debug!("running on the calling thread");
            self.timed_map(&blocks, &SequentialExecutor, &reporter, range)
        } else {
            let executor = RayonExecutor::new(self.settings.threads)?;
            debug!("running on {} workers", executor.worker_count());
            self.timed_map(&blocks, &executor, &reporter, range)
        };
        reporter.finish();

        let sum = outcome?;
        debug!("run finished: result {sum}");
        self.result = Some(sum);
        Ok(())
    }

    fn timed_map<S, E>(
        &mut self,
        source: &S,
        executor: &E,
        reporter: &ProgressReporter,
        range: UnitRange,
    ) -> Result<PartialSum, MapError>
    where
        S: BlockSource + ?Sized,
        E: ForkJoin,
    {
        let map = FileMap::new(source, executor, self.cutoff)
            .with_extraction(self.settings.extraction)
            .with_progress(reporter.bar());
        let start = Instant::now();
        let outcome = map.process(range);
        self.elapsed = Some(start.elapsed());
        outcome
    }

    pub(crate) fn output(&self, out: &mut impl Write) -> io::Result<()> {
        if let Some(result) = self.result {
            writeln!(out, "result {result}")?;
        }
        if let Some(elapsed) = self.elapsed {
            writeln!(out, "exectime {:.6}", elapsed.as_secs_f64())?;
        }
        Ok(())
    }

    /// Removes the input file, but only one this run wrote itself.
    pub(crate) fn destroy(&mut self) {
        if !self.created_input || self.settings.keep_input {
            return;
        }
        match fs::remove_file(&self.settings.input) {
            Ok(()) => debug!("removed {}", self.settings.input.display()),
            Err(e) => error!("failed to remove {}: {}", self.settings.input.display(), e),
        }
        self.created_input = false;
    }
}
