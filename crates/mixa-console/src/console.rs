//! The `Console` mixin
//!
//! `console_format` selects a style for subsequent writes and `reset` drops
//! it. Each write is wrapped in the style's escape and a reset escape, so a
//! styled write never bleeds into later plain output. Nothing is escaped when
//! the environment's `coloring` answers false.

use mixa_core::{Method, MixinResult, Module, Value};

use crate::ansi;

/// Receiver field holding the escape of the active style
const FORMAT_FIELD: &str = "console_format";

/// Build the `Console` mixin writing through `env`
pub fn console(env: &Module) -> MixinResult<Module> {
    let console = Module::new("Console");
    console.include(env)?;

    console.define(
        "print",
        Method::new(|call| {
            let text = call.arg(0).to_string();
            let out = match call.receiver().get_field(FORMAT_FIELD) {
                Some(Value::Str(prefix)) if !prefix.is_empty() => {
                    format!("{}{}{}", prefix, text, ansi::reset()?)
                }
                _ => text,
            };
            call.send("echo", vec![Value::str(out)])
        }),
    );
    console.define(
        "puts",
        Method::new(|call| {
            if !call.arg(0).is_null() {
                call.send("print", vec![call.arg(0).clone()])?;
            }
            call.send("echo", vec![Value::str("\n")])
        }),
    );
    console.define(
        "console_format",
        Method::new(|call| {
            let styles = call
                .args()
                .iter()
                .enumerate()
                .map(|(i, _)| call.str_arg(i))
                .collect::<MixinResult<Vec<&str>>>()?;
            let escape = ansi::escape(&styles)?;
            if call.send("coloring", vec![])?.is_truthy() {
                call.receiver().set_field(FORMAT_FIELD, escape);
            } else {
                call.receiver().set_field(FORMAT_FIELD, Value::null());
            }
            Ok(Value::null())
        }),
    );
    console.define(
        "reset",
        Method::new(|call| {
            call.receiver().set_field(FORMAT_FIELD, Value::null());
            Ok(Value::null())
        }),
    );

    Ok(console)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env;
    use mixa_core::{Class, MixinError, Object};

    fn printer(color: bool) -> Object {
        let class = Class::new("Printer");
        let env = env::capture(&env::terminal()).unwrap();
        class.include(console(&env).unwrap()).unwrap();
        let obj = class.instantiate(vec![]).unwrap();
        obj.set_field("color", color);
        obj
    }

    fn output(obj: &Object) -> String {
        obj.get_field("output")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default()
    }

    #[test]
    fn test_puts_and_print() {
        let obj = printer(false);
        obj.send("print", vec![Value::str("a")]).unwrap();
        obj.send("puts", vec![Value::str("b")]).unwrap();
        obj.send("puts", vec![]).unwrap();
        obj.send("puts", vec![Value::int(3)]).unwrap();
        assert_eq!(output(&obj), "ab\n\n3\n");
    }

    #[test]
    fn test_format_ignored_without_coloring() {
        let obj = printer(false);
        obj.send("console_format", vec![Value::str("bold"), Value::str("red")])
            .unwrap();
        obj.send("print", vec![Value::str("F")]).unwrap();
        assert_eq!(output(&obj), "F");
    }

    #[test]
    fn test_format_wraps_writes_when_coloring() {
        let obj = printer(true);
        obj.send("console_format", vec![Value::str("green")]).unwrap();
        obj.send("print", vec![Value::str(".")]).unwrap();
        obj.send("reset", vec![]).unwrap();
        obj.send("print", vec![Value::str("x")]).unwrap();

        let expected = format!(
            "{}.{}x",
            ansi::escape(&["green"]).unwrap(),
            ansi::reset().unwrap()
        );
        assert_eq!(output(&obj), expected);
    }

    #[test]
    fn test_unknown_style_rejected_even_without_coloring() {
        let obj = printer(false);
        assert!(matches!(
            obj.send("console_format", vec![Value::str("blink")]),
            Err(MixinError::ArgumentError(_))
        ));
        assert!(matches!(
            obj.send("console_format", vec![Value::int(1)]),
            Err(MixinError::ArgumentError(_))
        ));
    }
}
