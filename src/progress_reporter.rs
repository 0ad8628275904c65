use indicatif::{MultiProgress, ProgressBar, ProgressState, ProgressStyle};

/// Bar over processed units. Leaves bump it as they finish.
pub(crate) struct ProgressReporter {
    bar: Option<ProgressBar>,
}

impl ProgressReporter {
    /// `multi` is the same `MultiProgress` the logger is bridged to, so log
    /// lines are printed above the bar instead of through it.
    pub(crate) fn new(total_units: u64, multi: &MultiProgress, visible: bool) -> Self {
        if !visible {
            return Self { bar: None };
        }
        let bar = multi.add(ProgressBar::new(total_units));
        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} units ({eta}) {msg}",
        ) {
            bar.set_style(
                style
                    .with_key("eta", |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                        let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
                    })
                    .progress_chars("#>-"),
            );
        }
        Self { bar: Some(bar) }
    }

    /// `None` when progress is off, so leaves skip the bookkeeping.
    pub(crate) fn bar(&self) -> Option<ProgressBar> {
        self.bar.clone()
    }

    pub(crate) fn finish(&self) {
        let Some(bar) = &self.bar else {
            return;
        };
        let secs = bar.elapsed().as_secs_f64();
        let rate = if secs > 0.0 {
            bar.position() as f64 / secs
        } else {
            0.0
        };
        bar.finish_with_message(format!("({:.1} units/s)", rate));
    }
}

#[cfg(test)]
mod tests {
    use indicatif::ProgressDrawTarget;

    use super::*;

    #[test]
    fn hidden_reporter_hands_out_no_bar() {
        let reporter = ProgressReporter::new(10, &MultiProgress::new(), false);
        assert!(reporter.bar().is_none());
        reporter.finish();
    }

    #[test]
    fn visible_reporter_counts_units() {
        let multi = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        let reporter = ProgressReporter::new(7, &multi, true);
        let bar = reporter.bar().unwrap();
        assert_eq!(bar.length(), Some(7));
        bar.inc(3);
        bar.inc(4);
        assert_eq!(reporter.bar().unwrap().position(), 7);
        reporter.finish();
    }
}
