//! Driving a reporter instance with events

use std::io::BufRead;

use mixa_core::{Call, Class, MixinResult, Object, Value};

use crate::error::{ReportError, ReportResult};
use crate::event::Event;

/// Reporter instance fed with events
#[derive(Debug)]
pub struct Reporter {
    object: Object,
    passed: Option<bool>,
}

impl Reporter {
    /// Instantiate `class` as a reporter
    pub fn new(class: &Class) -> MixinResult<Self> {
        Ok(Self {
            object: class.instantiate(vec![])?,
            passed: None,
        })
    }

    /// Underlying object
    pub fn object(&self) -> &Object {
        &self.object
    }

    /// Outcome of the suite, once `endSuite` was seen
    pub fn passed(&self) -> Option<bool> {
        self.passed
    }

    /// Forward one event to the matching reporter method
    ///
    /// Events the reporter has no method for are ignored.
    pub fn handle(&mut self, event: &Event) -> ReportResult<()> {
        if let Event::EndSuite(totals) = event {
            self.passed = Some(totals.passed);
        }
        let method = event.method_name();
        if !self.object.responds_to(method) {
            log::trace!("{} ignores {}", self.object, method);
            return Ok(());
        }
        self.object.send(method, vec![event.payload()?])?;
        Ok(())
    }

    /// Feed every event of a JSON-lines stream; blank lines are skipped
    pub fn run(&mut self, input: impl BufRead) -> ReportResult<()> {
        for (index, line) in input.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let event = Event::from_line(&line).map_err(|source| ReportError::Event {
                line: index + 1,
                source,
            })?;
            self.handle(&event)?;
        }
        Ok(())
    }
}

// ── Helpers for reporter bodies ──────────────────────────────────────────

pub(crate) fn puts(call: &Call<'_>, text: impl Into<String>) -> MixinResult<Value> {
    call.send("puts", vec![Value::str(text)])
}

pub(crate) fn print(call: &Call<'_>, text: impl Into<String>) -> MixinResult<Value> {
    call.send("print", vec![Value::str(text)])
}

pub(crate) fn format(call: &Call<'_>, styles: &[&str]) -> MixinResult<Value> {
    call.send(
        "console_format",
        styles.iter().map(|s| Value::str(*s)).collect(),
    )
}

pub(crate) fn reset(call: &Call<'_>) -> MixinResult<Value> {
    call.send("reset", vec![])
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixa_core::{Method, MethodBag, Mixin};

    fn counting_class() -> Class {
        Class::build(
            "Counting",
            [Mixin::from(MethodBag::new().method(
                "end_test",
                Method::new(|call| {
                    call.receiver().update_field("ended", |v| {
                        *v = Value::int(v.as_int().unwrap_or(0) + 1)
                    });
                    Ok(Value::null())
                }),
            ))],
        )
        .unwrap()
    }

    #[test]
    fn test_unhandled_events_are_ignored() {
        let mut reporter = Reporter::new(&counting_class()).unwrap();
        let input = concat!(
            r#"{"event":"startSuite","data":{"fullName":"S"}}"#,
            "\n",
            r#"{"event":"endTest","data":{"fullName":"S a"}}"#,
            "\n\n",
            r#"{"event":"endTest","data":{"fullName":"S b"}}"#,
            "\n",
            r#"{"event":"endSuite","data":{"passed":true,"tests":2,"assertions":2,"failures":0,"errors":0}}"#,
            "\n",
        );
        reporter.run(input.as_bytes()).unwrap();

        assert_eq!(reporter.object().get_field("ended"), Some(Value::int(2)));
        assert_eq!(reporter.passed(), Some(true));
    }

    #[test]
    fn test_bad_line_reports_its_number() {
        let mut reporter = Reporter::new(&counting_class()).unwrap();
        let input = "\n{\"event\":\"endTest\",\"data\":{\"fullName\":\"x\"}}\nnot json\n";
        match reporter.run(input.as_bytes()) {
            Err(ReportError::Event { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected a malformed event error, got {:?}", other),
        }
        assert_eq!(reporter.passed(), None);
    }
}
