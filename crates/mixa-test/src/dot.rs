//! Dot reporter
//!
//! Prints one character per test while the suite runs, then every fault and
//! a summary:
//!
//! ```text
//! Loaded suite: Sample
//!
//! Started
//! .F.
//!
//! 1) Failure: Sample b
//! Expected 1, got 2
//!
//! Finished in 0.5 seconds
//! 3 tests, 4 assertions, 1 failure, 0 errors
//! ```

use mixa_core::{Call, Class, Method, MethodBag, Mixin, MixinResult, Module, Value};

use crate::event::{typed, Fault, SuiteInfo, Totals};
use crate::reporter::{format, print, puts, reset};

/// Progress character per fault kind
pub const SYMBOLS: [(&str, &str); 2] = [("failure", "F"), ("error", "E")];

/// Heading per fault kind
pub const NAMES: [(&str, &str); 2] = [("failure", "Failure"), ("error", "Error")];

fn table(entries: &[(&str, &str)]) -> Value {
    Value::map(entries.iter().map(|(k, v)| (*k, Value::str(*v))))
}

fn lookup(call: &Call<'_>, constant: &str, key: &str) -> String {
    call.receiver()
        .get(constant)
        .map(|t| t.get(key).to_string())
        .unwrap_or_default()
}

fn plural(number: u64, noun: &str) -> String {
    format!("{} {}{}", number, noun, if number == 1 { "" } else { "s" })
}

fn print_fault(call: &Call<'_>, index: usize, fault: &Fault) -> MixinResult<()> {
    puts(call, "")?;
    format(call, &["bold", "red"])?;
    let name = lookup(call, "NAMES", fault.error.kind.as_str());
    puts(
        call,
        format!("\n{}) {}: {}", index, name, fault.test.full_name),
    )?;
    reset(call)?;
    puts(call, fault.error.message.as_str())?;
    if let Some(backtrace) = &fault.error.backtrace {
        puts(call, backtrace.as_str())?;
    }
    reset(call)?;
    Ok(())
}

fn print_summary(call: &Call<'_>, totals: &Totals) -> MixinResult<()> {
    reset(call)?;
    puts(call, "")?;
    puts(call, format!("Finished in {} seconds", totals.runtime))?;

    format(call, &[if totals.passed { "green" } else { "red" }])?;
    puts(
        call,
        [
            plural(totals.tests, "test"),
            plural(totals.assertions, "assertion"),
            plural(totals.failures, "failure"),
            plural(totals.errors, "error"),
        ]
        .join(", "),
    )?;
    reset(call)?;
    puts(call, "")?;
    Ok(())
}

fn methods() -> MethodBag {
    MethodBag::new()
        .constant("SYMBOLS", table(&SYMBOLS))
        .constant("NAMES", table(&NAMES))
        .method(
            "start_suite",
            Method::new(|call| {
                let suite: SuiteInfo = typed(call.arg(0))?;
                call.receiver().set_field("faults", Value::list([]));

                format(call, &["bold"])?;
                puts(call, format!("Loaded suite: {}", suite.full_name))?;
                puts(call, "")?;
                reset(call)?;
                puts(call, "Started")?;
                Ok(Value::null())
            }),
        )
        .method(
            "start_test",
            Method::new(|call| {
                call.receiver().set_field("output_fault", false);
                Ok(Value::null())
            }),
        )
        .method(
            "add_fault",
            Method::new(|call| {
                let fault: Fault = typed(call.arg(0))?;
                let receiver = call.receiver();
                receiver.update_field("faults", |faults| match faults.as_list_mut() {
                    Some(list) => list.push(call.arg(0).clone()),
                    None => *faults = Value::list([call.arg(0).clone()]),
                });

                if receiver.get_field("output_fault").is_some_and(|v| v.is_truthy()) {
                    return Ok(Value::null());
                }
                receiver.set_field("output_fault", true);
                format(call, &["bold", "red"])?;
                print(call, lookup(call, "SYMBOLS", fault.error.kind.as_str()))?;
                reset(call)?;
                Ok(Value::null())
            }),
        )
        .method(
            "end_test",
            Method::new(|call| {
                if call
                    .receiver()
                    .get_field("output_fault")
                    .is_some_and(|v| v.is_truthy())
                {
                    return Ok(Value::null());
                }
                format(call, &["green"])?;
                print(call, ".")?;
                reset(call)?;
                Ok(Value::null())
            }),
        )
        .method(
            "end_suite",
            Method::new(|call| {
                let totals: Totals = typed(call.arg(0))?;
                let faults = call.receiver().get_field("faults").unwrap_or_default();
                for (i, fault) in faults.as_list().unwrap_or_default().iter().enumerate() {
                    print_fault(call, i + 1, &typed(fault)?)?;
                }
                print_summary(call, &totals)?;
                Ok(Value::null())
            }),
        )
}

/// Build the dot reporter class on top of a `Console` mixin
pub fn dot(console: &Module) -> MixinResult<Class> {
    let class = Class::build("Dot", [Mixin::from(console), Mixin::from(methods())])?;
    class.module().extend(
        MethodBag::new().constant("description", "prints a dot per passing test and a summary"),
    )?;
    Ok(class)
}
