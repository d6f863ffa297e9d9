//! `mixa ancestors`: Show how reporter classes are linearized.

use std::collections::BTreeMap;

use anyhow::bail;
use mixa_console::env;
use mixa_test::Registry;

use crate::output::{self, StyledOutput};

pub fn execute(reporter: Option<&str>, json: bool) -> anyhow::Result<()> {
    let registry = Registry::standard(&env::terminal())?;

    let mut chains: Vec<(&str, Vec<String>)> = Vec::new();
    for (name, class) in registry.iter() {
        if reporter.is_some_and(|r| r != name) {
            continue;
        }
        let chain = class
            .module()
            .ancestors()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        chains.push((name, chain));
    }
    if let Some(name) = reporter {
        if chains.is_empty() {
            bail!("unknown reporter `{}`", name);
        }
    }

    if json {
        let map: BTreeMap<&str, Vec<String>> = chains.into_iter().collect();
        println!("{}", serde_json::to_string_pretty(&map)?);
        return Ok(());
    }

    let mut out = StyledOutput::new(output::resolve_color_choice(None));
    for (name, chain) in chains {
        out.bold(name);
        out.plain(": ");
        out.plain(&chain.join(", "));
        out.newline();
    }
    Ok(())
}
