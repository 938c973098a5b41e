use std::io::Read as _;
use std::path::Path;

use anyhow::Context as _;
use rainrun_core::Thresholds;

use crate::cli::ParseArgs;
use crate::exit_codes::ExitCode;
use crate::output;
use crate::report::evaluate;
use crate::run_error::RunError;

pub fn parse(args: ParseArgs) -> Result<ExitCode, RunError> {
    let out = output::formatter(args.output);
    let text = read_report(&args.report).map_err(RunError::InvalidInput)?;
    evaluate(&text, &Thresholds::from(args.thresholds), out.as_ref())
}

fn read_report(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("read report from stdin")?;
        return Ok(String::from_utf8_lossy(&buf).into_owned());
    }

    let bytes =
        std::fs::read(path).with_context(|| format!("read report `{}`", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
