use std::io::Write as _;

use anyhow::Context as _;
use rainrun_core::{Thresholds, TrackSummary, render_with};

use super::OutputFormatter;

pub(crate) struct HumanReadableOutput;

impl OutputFormatter for HumanReadableOutput {
    fn print_report(
        &self,
        tracks: &[TrackSummary],
        thresholds: &Thresholds,
    ) -> anyhow::Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(render_with(tracks, thresholds).as_bytes())
            .context("write results table")?;
        stdout.flush().context("flush stdout")?;
        Ok(())
    }
}
