//! Lookup and call-super dispatch
//!
//! Dispatching `name` gathers every implementation along the ancestor chain
//! and runs the most specific one. The running body receives a [`Call`]
//! whose [`call_super`](Call::call_super) steps one entry back along that
//! list.
//!
//! # Frames
//!
//! Each dispatch owns one [`SuperFrame`]: the callee list, a cursor into it
//! and the argument snapshot that super calls reuse. The frame lives on the
//! Rust stack of the dispatching call and is reached only through the
//! `Call` handed to each body, so a dispatch started from inside another
//! (through [`Call::send`] or directly) gets a frame of its own and cannot
//! disturb the outer cursor or snapshot. Nothing is attached to the
//! receiver.
//!
//! ```text
//! callees: [X.m, Y.m, Z.m]       cursor
//! dispatch          -> Z.m          2
//!   call_super      -> Y.m          1
//!     call_super    -> X.m          0
//!       call_super  -> InvalidSuperCall
//! ```

use std::cell::{Cell, RefCell};

use crate::error::{MixinError, MixinResult};
use crate::method::{Member, Method};
use crate::module::Module;
use crate::object::Object;
use crate::value::Value;

static NULL: Value = Value::Null;

/// Per-dispatch call-super state
pub(crate) struct SuperFrame {
    callees: Vec<Method>,
    cursor: Cell<usize>,
    params: RefCell<Vec<Value>>,
}

/// Invocation handed to a method body
pub struct Call<'a> {
    receiver: &'a Object,
    name: &'a str,
    args: Vec<Value>,
    frame: Option<&'a SuperFrame>,
}

impl<'a> Call<'a> {
    /// Invocation of an unwrapped method: `call_super` is unavailable
    pub(crate) fn plain(receiver: &'a Object, name: &'a str, args: Vec<Value>) -> Self {
        Self {
            receiver,
            name,
            args,
            frame: None,
        }
    }

    /// Object the method runs on
    pub fn receiver(&self) -> &Object {
        self.receiver
    }

    /// Name the method was invoked under
    pub fn name(&self) -> &str {
        self.name
    }

    /// All arguments
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Argument at `index`, null when absent
    pub fn arg(&self, index: usize) -> &Value {
        self.args.get(index).unwrap_or(&NULL)
    }

    /// String argument at `index`
    pub fn str_arg(&self, index: usize) -> MixinResult<&str> {
        let value = self.arg(index);
        value.as_str().ok_or_else(|| {
            MixinError::ArgumentError(format!(
                "{}: argument {} must be a string, got {}",
                self.name,
                index,
                value.type_name()
            ))
        })
    }

    /// Send another message to the receiver
    pub fn send(&self, name: &str, args: Vec<Value>) -> MixinResult<Value> {
        self.receiver.send(name, args)
    }

    /// Whether a more distant implementation is available
    pub fn has_super(&self) -> bool {
        self.frame.map_or(false, |f| f.cursor.get() > 0)
    }

    /// Run the next more distant implementation of this method
    ///
    /// `overrides` replace the stored arguments position by position; the
    /// remaining positions keep the values of the original dispatch. The
    /// replacement persists for later super calls made through this
    /// dispatch.
    pub fn call_super(&self, overrides: &[Value]) -> MixinResult<Value> {
        let frame = match self.frame {
            Some(frame) if frame.cursor.get() > 0 => frame,
            _ => {
                return Err(MixinError::InvalidSuperCall {
                    method: self.name.to_string(),
                })
            }
        };

        let args = {
            let mut params = frame.params.borrow_mut();
            for (i, value) in overrides.iter().enumerate() {
                if i < params.len() {
                    params[i] = value.clone();
                } else {
                    params.resize(i, Value::Null);
                    params.push(value.clone());
                }
            }
            params.clone()
        };

        let index = frame.cursor.get() - 1;
        log::trace!("call_super `{}` -> callee {}", self.name, index);
        frame.cursor.set(index);
        let callee = &frame.callees[index];
        let result = callee.invoke(&Call {
            receiver: self.receiver,
            name: self.name,
            args,
            frame: Some(frame),
        });
        frame.cursor.set(index + 1);
        result
    }
}

impl Module {
    /// Every member named `name` along the ancestor chain, most specific last
    pub fn lookup(&self, name: &str) -> Vec<Member> {
        self.ancestors()
            .iter()
            .filter_map(|ancestor| ancestor.own_member(name))
            .collect()
    }

    /// Invoke `name` on `receiver` through this module's ancestor chain
    pub fn dispatch(&self, receiver: &Object, name: &str, args: Vec<Value>) -> MixinResult<Value> {
        let callees: Vec<Method> = self
            .lookup(name)
            .into_iter()
            .filter_map(|member| match member {
                Member::Method(m) => Some(m),
                Member::Value(_) => None,
            })
            .collect();

        let Some(top) = callees.len().checked_sub(1) else {
            return Err(MixinError::NoMethod {
                method: name.to_string(),
                receiver: self.name().to_string(),
            });
        };

        if !callees[top].calls_super() {
            return callees[top].invoke(&Call::plain(receiver, name, args));
        }

        let frame = SuperFrame {
            callees,
            cursor: Cell::new(top),
            params: RefCell::new(args.clone()),
        };
        let callee = frame.callees[top].clone();
        callee.invoke(&Call {
            receiver,
            name,
            args,
            frame: Some(&frame),
        })
    }
}
