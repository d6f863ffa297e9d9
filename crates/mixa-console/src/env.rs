//! Output environments
//!
//! An environment is a module answering five messages:
//!
//! | message          | returns                                   |
//! |------------------|-------------------------------------------|
//! | `coloring`       | whether escapes should be written         |
//! | `echo(text)`     | null; writes `text` as is                 |
//! | `envvar(name)`   | the variable's value, or null             |
//! | `exit(status)`   | null, when it returns at all              |
//! | `get_dimensions` | `[columns, lines]`                        |

use std::io::{self, IsTerminal, Write};

use mixa_core::{Method, MixinError, MixinResult, Module, Value};

/// Variable that turns colour off whenever it is set
pub const NO_COLOR: &str = "NO_COLOR";

/// Width used when `COLUMNS` is unset or malformed
pub const DEFAULT_COLUMNS: i64 = 80;
/// Height used when `LINES` is unset or malformed
pub const DEFAULT_LINES: i64 = 24;

fn dimension(call: &mixa_core::Call<'_>, var: &str, default: i64) -> MixinResult<i64> {
    let value = call.send("envvar", vec![Value::str(var)])?;
    Ok(value
        .as_str()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default))
}

/// Environment bound to the running process
pub fn terminal() -> Module {
    let env = Module::new("Terminal");

    env.define(
        "coloring",
        Method::new(|call| {
            if !call.send("envvar", vec![Value::str(NO_COLOR)])?.is_null() {
                return Ok(Value::bool(false));
            }
            Ok(Value::bool(io::stdout().is_terminal()))
        }),
    );
    env.define(
        "echo",
        Method::new(|call| {
            let text = call.str_arg(0)?;
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .and_then(|_| stdout.flush())
                .map_err(|e| MixinError::Raised(format!("echo: {}", e)))?;
            Ok(Value::null())
        }),
    );
    env.define(
        "envvar",
        Method::new(|call| {
            let name = call.str_arg(0)?;
            Ok(std::env::var(name).map(Value::str).unwrap_or_default())
        }),
    );
    env.define(
        "exit",
        Method::new(|call| {
            let status = call.arg(0).as_int().unwrap_or(0);
            log::debug!("exiting with status {}", status);
            std::process::exit(status as i32)
        }),
    );
    env.define(
        "get_dimensions",
        Method::new(|call| {
            let columns = dimension(call, "COLUMNS", DEFAULT_COLUMNS)?;
            let lines = dimension(call, "LINES", DEFAULT_LINES)?;
            Ok(Value::list([Value::int(columns), Value::int(lines)]))
        }),
    );

    env
}

/// Environment recording its effects on the receiver
///
/// Receiver fields read and written:
///
/// - `output`: string every `echo` appends to
/// - `exit_status`: last status passed to `exit`
/// - `env`: map consulted by `envvar` before `base`
/// - `color`: answer to `coloring`, false when unset
/// - `columns`: width reported by `get_dimensions`, `base` decides when unset
pub fn capture(base: &Module) -> MixinResult<Module> {
    let env = Module::new("Capture");
    env.include(base)?;

    env.define(
        "coloring",
        Method::new(|call| {
            let color = call.receiver().get_field("color").unwrap_or_default();
            Ok(Value::bool(color.is_truthy()))
        }),
    );
    env.define(
        "echo",
        Method::new(|call| {
            let text = call.str_arg(0)?;
            call.receiver().update_field("output", |output| match output {
                Value::Str(s) => s.push_str(text),
                other => *other = Value::str(text),
            });
            Ok(Value::null())
        }),
    );
    env.define(
        "exit",
        Method::new(|call| {
            call.receiver().set_field("exit_status", call.arg(0).clone());
            Ok(Value::null())
        }),
    );
    env.define(
        "envvar",
        Method::with_super(|call| {
            let name = call.str_arg(0)?;
            let vars = call.receiver().get_field("env").unwrap_or_default();
            match vars.get(name) {
                Value::Null => call.call_super(&[]),
                value => Ok(value.clone()),
            }
        }),
    );
    env.define(
        "get_dimensions",
        Method::with_super(|call| {
            let mut dims = call.call_super(&[])?;
            if let Some(columns) = call.receiver().get_field("columns") {
                if let Some(items) = dims.as_list_mut() {
                    if let Some(first) = items.first_mut() {
                        *first = columns;
                    }
                }
            }
            Ok(dims)
        }),
    );

    Ok(env)
}
