//! Named reporter classes

use mixa_console::console;
use mixa_core::{Class, MixinResult, Module};

use crate::error::{ReportError, ReportResult};
use crate::reporter::Reporter;
use crate::{dot, protocol};

/// Reporter used when none is named
pub const DEFAULT_REPORTER: &str = "dot";

/// Reporter classes by name, in registration order
#[derive(Debug, Default)]
pub struct Registry {
    reporters: Vec<(String, Class)>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in reporters, writing through `env`
    pub fn standard(env: &Module) -> MixinResult<Self> {
        let console = console(env)?;
        let mut registry = Self::new();
        registry.register("dot", dot::dot(&console)?);
        registry.register("protocol", protocol::protocol(&console)?);
        Ok(registry)
    }

    /// Register `class` under `name`, replacing any earlier registration
    pub fn register(&mut self, name: impl Into<String>, class: Class) {
        let name = name.into();
        log::debug!("registered reporter `{}` ({})", name, class.name());
        match self.reporters.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = class,
            None => self.reporters.push((name, class)),
        }
    }

    /// Class registered under `name`
    pub fn get(&self, name: &str) -> Option<&Class> {
        self.reporters
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, class)| class)
    }

    /// Registered names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.reporters.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Registered classes with their names
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Class)> {
        self.reporters.iter().map(|(n, c)| (n.as_str(), c))
    }

    /// The `description` constant of a reporter's extension module
    pub fn description(&self, name: &str) -> Option<String> {
        let extension = self.get(name)?.module().extension()?;
        let member = extension.lookup("description").pop()?;
        member.as_value()?.as_str().map(str::to_string)
    }

    /// Instantiate the reporter registered under `name`
    pub fn create(&self, name: &str) -> ReportResult<Reporter> {
        let class = self
            .get(name)
            .ok_or_else(|| ReportError::UnknownReporter(name.to_string()))?;
        Ok(Reporter::new(class)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixa_console::env;

    fn standard() -> Registry {
        let env = env::capture(&env::terminal()).unwrap();
        Registry::standard(&env).unwrap()
    }

    #[test]
    fn test_standard_reporters() {
        let registry = standard();
        assert_eq!(registry.names(), vec!["dot", "protocol"]);
        assert!(registry
            .description("dot")
            .is_some_and(|d| d.contains("dot")));
        assert!(registry.description("protocol").is_some());
        assert_eq!(registry.description("missing"), None);
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = standard();
        registry.register("dot", Class::new("Other"));
        assert_eq!(registry.names(), vec!["dot", "protocol"]);
        assert_eq!(registry.get("dot").map(|c| c.name()), Some("Other"));
        assert_eq!(registry.description("dot"), None);
    }

    #[test]
    fn test_create_unknown() {
        assert!(matches!(
            standard().create("tap"),
            Err(ReportError::UnknownReporter(name)) if name == "tap"
        ));
    }

    #[test]
    fn test_reporters_share_one_console() {
        let registry = standard();
        let dot = registry.get("dot").unwrap().module().ancestors();
        let protocol = registry.get("protocol").unwrap().module().ancestors();
        let console = dot.iter().find(|m| m.name() == "Console").unwrap();
        assert!(protocol.iter().any(|m| m.ptr_eq(console)));
    }
}
