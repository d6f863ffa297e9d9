//! `mixa reporters`: List available reporters.

use mixa_console::env;
use mixa_test::registry::DEFAULT_REPORTER;
use mixa_test::Registry;

use crate::output::{self, StyledOutput};

pub fn execute() -> anyhow::Result<()> {
    let registry = Registry::standard(&env::terminal())?;
    let mut out = StyledOutput::new(output::resolve_color_choice(None));

    let width = registry.names().iter().map(|n| n.len()).max().unwrap_or(0);
    for name in registry.names() {
        out.bold(&format!("  {:width$}", name, width = width));
        out.plain("  ");
        out.plain(&registry.description(name).unwrap_or_default());
        if name == DEFAULT_REPORTER {
            out.info(" (default)");
        }
        out.newline();
    }
    Ok(())
}
