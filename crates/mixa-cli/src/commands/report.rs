//! `mixa report`: Feed test run events to a reporter.

use std::fs::File;
use std::io::{self, BufReader};

use anyhow::Context;
use mixa_core::Value;
use mixa_test::Registry;

use crate::output;

/// Arguments for the report command.
pub struct ReportArgs {
    pub file: Option<String>,
    pub reporter: String,
    pub color: String,
}

pub fn execute(args: ReportArgs) -> anyhow::Result<()> {
    let color_choice = output::resolve_color_choice(Some(&args.color));
    let env = output::environment(color_choice)?;
    let registry = Registry::standard(&env)?;
    let mut reporter = registry.create(&args.reporter)?;

    match &args.file {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("cannot open {}", path))?;
            reporter.run(BufReader::new(file))?;
        }
        None => reporter.run(io::stdin().lock())?,
    }

    match reporter.passed() {
        Some(true) => Ok(()),
        outcome => {
            if outcome.is_none() {
                log::warn!("event stream ended before endSuite");
            }
            reporter.object().send("exit", vec![Value::int(1)])?;
            Ok(())
        }
    }
}
