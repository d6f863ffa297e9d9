//! Line protocol reporter
//!
//! Writes one JSON message per line for a driving process to consume:
//!
//! ```json
//! {"type":"info","total":3}
//! {"type":"result","id":1,"description":"a","suite":["Sample"],"success":true,"skipped":0,"time":4.0,"log":[]}
//! {"type":"complete"}
//! ```

use mixa_core::{Class, Method, MethodBag, Mixin, MixinError, MixinResult, Module, Value};
use serde::{Deserialize, Serialize};

use crate::event::{typed, Fault, Scope, SuiteInfo};
use crate::reporter::puts;

/// Message written to the driving process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Message {
    /// Suite is about to run `total` tests
    Info {
        /// Number of tests
        total: u64,
    },
    /// One test finished
    #[serde(rename = "result")]
    TestResult {
        /// Sequence number, starting at 1
        id: u64,
        /// Short test name
        description: String,
        /// Enclosing context names
        suite: Vec<String>,
        /// Whether no fault was raised
        success: bool,
        /// Always zero; skipped tests are not reported
        skipped: u64,
        /// Milliseconds between start and end
        time: f64,
        /// Fault messages, with backtraces appended
        log: Vec<String>,
    },
    /// Suite finished
    Complete,
}

fn send(call: &mixa_core::Call<'_>, message: &Message) -> MixinResult<Value> {
    let line = serde_json::to_string(message).map_err(|e| MixinError::Raised(e.to_string()))?;
    puts(call, line)
}

fn methods() -> MethodBag {
    MethodBag::new()
        .method(
            "initialize",
            Method::new(|call| {
                call.receiver().set_field("test_id", 0);
                Ok(Value::null())
            }),
        )
        .method(
            "start_suite",
            Method::new(|call| {
                let suite: SuiteInfo = typed(call.arg(0))?;
                send(call, &Message::Info { total: suite.size })?;
                Ok(Value::null())
            }),
        )
        .method(
            "start_test",
            Method::new(|call| {
                let test: Scope = typed(call.arg(0))?;
                let receiver = call.receiver();
                receiver.set_field("faults", Value::list([]));
                receiver.set_field("start", test.timestamp);
                Ok(Value::null())
            }),
        )
        .method(
            "add_fault",
            Method::new(|call| {
                let fault: Fault = typed(call.arg(0))?;
                let mut message = fault.error.message;
                if let Some(backtrace) = fault.error.backtrace {
                    message.push('\n');
                    message.push_str(&backtrace);
                }
                call.receiver()
                    .update_field("faults", |faults| match faults.as_list_mut() {
                        Some(list) => list.push(Value::str(message)),
                        None => *faults = Value::list([Value::str(message)]),
                    });
                Ok(Value::null())
            }),
        )
        .method(
            "end_test",
            Method::new(|call| {
                let test: Scope = typed(call.arg(0))?;
                let receiver = call.receiver();
                let id = receiver.update_field("test_id", |id| {
                    let next = id.as_int().unwrap_or(0) + 1;
                    *id = Value::int(next);
                    next as u64
                });
                let start = receiver
                    .get_field("start")
                    .and_then(|v| v.as_float())
                    .unwrap_or(test.timestamp);
                let log: Vec<String> = receiver
                    .get_field("faults")
                    .unwrap_or_default()
                    .as_list()
                    .unwrap_or_default()
                    .iter()
                    .map(|v| v.to_string())
                    .collect();

                send(
                    call,
                    &Message::TestResult {
                        id,
                        description: test.short_name,
                        suite: test.context,
                        success: log.is_empty(),
                        skipped: 0,
                        time: test.timestamp - start,
                        log,
                    },
                )?;
                Ok(Value::null())
            }),
        )
        .method(
            "end_suite",
            Method::new(|call| {
                send(call, &Message::Complete)?;
                Ok(Value::null())
            }),
        )
}

/// Build the line protocol reporter class on top of a `Console` mixin
pub fn protocol(console: &Module) -> MixinResult<Class> {
    let class = Class::build("Protocol", [Mixin::from(console), Mixin::from(methods())])?;
    class.module().extend(
        MethodBag::new().constant("description", "writes one JSON message per test for a driver"),
    )?;
    Ok(class)
}
