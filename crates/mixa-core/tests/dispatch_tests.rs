//! Integration tests for lookup and call-super dispatch
//!
//! Tests cover:
//! - Lookup order along the chain
//! - Super-call order and the failure past the most distant ancestor
//! - Argument overrides in super calls
//! - Nested and re-entrant dispatch
//! - Redefinition while a chain is running

use std::cell::RefCell;
use std::rc::Rc;

use mixa_core::{
    Call, Class, Member, Method, MethodBag, Mixin, MixinError, MixinResult, Module, Object, Target,
    Value,
};

fn recorder(log: &Rc<RefCell<Vec<String>>>, tag: &'static str) -> Method {
    let log = log.clone();
    Method::with_super(move |call| {
        log.borrow_mut().push(tag.to_string());
        call.call_super(&[])
    })
}

fn xyz() -> (Module, Module, Module) {
    let x = Module::new("X");
    let y = Module::new("Y");
    let z = Module::new("Z");
    y.include(&x).unwrap();
    z.include(&y).unwrap();
    (x, y, z)
}

#[test]
fn test_lookup_returns_most_specific_last() {
    let (x, y, z) = xyz();
    let mx = Method::new(|_| Ok(Value::str("x")));
    let my = Method::new(|_| Ok(Value::str("y")));
    let mz = Method::new(|_| Ok(Value::str("z")));
    x.define("m", mx.clone());
    y.define("m", my.clone());
    z.define("m", mz.clone());

    let found = z.lookup("m");
    assert_eq!(found.len(), 3);
    for (member, expected) in found.iter().zip([&mx, &my, &mz]) {
        assert!(member.as_method().unwrap().same(expected));
    }
}

#[test]
fn test_lookup_skips_modules_without_the_name() {
    let (x, _y, z) = xyz();
    x.define("m", Value::int(1));
    z.define("m", Value::int(3));

    let values: Vec<Value> = z
        .lookup("m")
        .iter()
        .filter_map(|m| m.as_value().cloned())
        .collect();
    assert_eq!(values, vec![Value::int(1), Value::int(3)]);
}

#[test]
fn test_super_order_and_invalid_super() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let (x, y, z) = xyz();
    x.define("m", recorder(&log, "x"));
    y.define("m", recorder(&log, "y"));
    z.define("m", recorder(&log, "z"));

    let receiver = Object::with_table(z.clone(), Target::new());
    let err = z.dispatch(&receiver, "m", vec![]).unwrap_err();

    assert_eq!(*log.borrow(), vec!["z", "y", "x"]);
    assert_eq!(
        err,
        MixinError::InvalidSuperCall {
            method: "m".to_string()
        }
    );
}

#[test]
fn test_greet_loud_scenario() {
    let greet = Module::new("Greet");
    greet.define("hello", Method::new(|_| Ok(Value::str("hi"))));

    let loud = Module::new("Loud");
    loud.include(&greet).unwrap();
    loud.define(
        "hello",
        Method::with_super(|call| {
            let base = call.call_super(&[])?;
            Ok(Value::str(format!(
                "{}!",
                base.as_str().unwrap_or_default().to_uppercase()
            )))
        }),
    );

    let target = Target::new();
    loud.resolve_onto(&target);
    let t = Object::with_table(loud.clone(), target);
    assert_eq!(t.send("hello", vec![]).unwrap(), Value::str("HI!"));
}

#[test]
fn test_argument_override_keeps_omitted_positions() {
    let base = Module::new("Base");
    base.define(
        "join",
        Method::new(|call| {
            let parts: Vec<String> = call.args().iter().map(|v| v.to_string()).collect();
            Ok(Value::str(parts.join("-")))
        }),
    );
    let class = Class::new("Override");
    class.include(&base).unwrap();
    class.define(
        "join",
        Method::with_super(|call| call.call_super(&[Value::str("A")])),
    );

    let obj = class.instantiate(vec![]).unwrap();
    let out = obj
        .send("join", vec![Value::str("a"), Value::str("b"), Value::str("c")])
        .unwrap();
    assert_eq!(out, Value::str("A-b-c"));
}

#[test]
fn test_override_persists_along_the_chain() {
    let x = Module::new("X");
    x.define(
        "m",
        Method::new(|call| Ok(Value::list(call.args().to_vec()))),
    );
    let y = Module::new("Y");
    y.include(&x).unwrap();
    // Y passes nothing new: it must still see Z's override
    y.define("m", Method::with_super(|call| call.call_super(&[])));
    let class = Class::new("Z");
    class.include(&y).unwrap();
    class.define(
        "m",
        Method::with_super(|call| call.call_super(&[Value::int(10)])),
    );

    let obj = class.instantiate(vec![]).unwrap();
    let out = obj.send("m", vec![Value::int(1), Value::int(2)]).unwrap();
    assert_eq!(out, Value::list([Value::int(10), Value::int(2)]));
}

#[test]
fn test_super_receives_original_args_without_overrides() {
    let base = Module::new("Base");
    base.define("echo", Method::new(|call| Ok(call.arg(0).clone())));
    let class = Class::new("Echo");
    class.include(&base).unwrap();
    class.define("echo", Method::with_super(|call| call.call_super(&[])));

    let obj = class.instantiate(vec![]).unwrap();
    assert_eq!(obj.send("echo", vec![Value::int(7)]).unwrap(), Value::int(7));
}

#[test]
fn test_nested_dispatch_keeps_frames_apart() {
    // outer() calls super, whose body dispatches inner() on the same
    // receiver; inner has its own chain and must not shift outer's cursor.
    let base = Module::new("Base");
    base.define(
        "outer",
        Method::new(|call| {
            let inner = call.send("inner", vec![Value::str("n")])?;
            Ok(Value::str(format!("base-outer({})", inner)))
        }),
    );
    base.define("inner", Method::new(|call| Ok(Value::str(format!("base-inner:{}", call.arg(0))))));

    let mid = Module::new("Mid");
    mid.include(&base).unwrap();
    mid.define(
        "outer",
        Method::with_super(|call| {
            let first = call.call_super(&[])?;
            let second = call.call_super(&[])?;
            assert_eq!(first, second);
            Ok(Value::str(format!("mid({})", first)))
        }),
    );
    mid.define(
        "inner",
        Method::with_super(|call| {
            let below = call.call_super(&[Value::str("overridden")])?;
            Ok(Value::str(format!("mid-inner[{}]", below)))
        }),
    );

    let class = Class::new("Nested");
    class.include(&mid).unwrap();
    let obj = class.instantiate(vec![]).unwrap();

    let out = obj.send("outer", vec![Value::str("o")]).unwrap();
    assert_eq!(
        out,
        Value::str("mid(base-outer(mid-inner[base-inner:overridden]))")
    );
}

#[test]
fn test_recursive_dispatch_of_same_method() {
    let base = Module::new("Base");
    base.define(
        "count",
        Method::new(|call| Ok(Value::int(call.arg(0).as_int().unwrap_or(0)))),
    );
    let class = Class::new("Recursive");
    class.include(&base).unwrap();
    class.define(
        "count",
        Method::with_super(|call| {
            let n = call.arg(0).as_int().unwrap_or(0);
            if n > 0 {
                let rest = call.send("count", vec![Value::int(n - 1)])?;
                let here = call.call_super(&[])?;
                Ok(Value::int(rest.as_int().unwrap() + here.as_int().unwrap()))
            } else {
                call.call_super(&[])
            }
        }),
    );

    let obj = class.instantiate(vec![]).unwrap();
    // 3 + 2 + 1 + 0
    assert_eq!(obj.send("count", vec![Value::int(3)]).unwrap(), Value::int(6));
}

#[test]
fn test_failed_super_leaves_cursor_usable() {
    let base = Module::new("Base");
    base.define(
        "step",
        Method::new(|call| match call.arg(0).as_bool() {
            Some(true) => Err(MixinError::Raised("boom".to_string())),
            _ => Ok(Value::str("ok")),
        }),
    );
    let class = Class::new("Retry");
    class.include(&base).unwrap();
    class.define(
        "step",
        Method::with_super(|call| match call.call_super(&[]) {
            Ok(v) => Ok(v),
            Err(_) => call.call_super(&[Value::bool(false)]),
        }),
    );

    let obj = class.instantiate(vec![]).unwrap();
    assert_eq!(obj.send("step", vec![Value::bool(true)]).unwrap(), Value::str("ok"));
}

#[test]
fn test_redefinition_during_chain_applies_to_next_dispatch() {
    let class = Class::new("Mutating");
    let module = class.module().clone();
    let base = Module::new("Base");
    base.define("v", Method::new(|_| Ok(Value::int(1))));
    class.include(&base).unwrap();

    let base_handle = base.clone();
    class.define(
        "v",
        Method::with_super(move |call| {
            let current = call.call_super(&[])?;
            base_handle.define("v", Method::new(|_| Ok(Value::int(2))));
            Ok(current)
        }),
    );

    let obj = class.instantiate(vec![]).unwrap();
    assert_eq!(obj.send("v", vec![]).unwrap(), Value::int(1));
    assert_eq!(obj.send("v", vec![]).unwrap(), Value::int(2));
    assert_eq!(module.lookup("v").len(), 2);
}

#[test]
fn test_instance_method_skips_constants() {
    let m = Module::new("M");
    m.define("run", Method::new(|_| Ok(Value::null())));
    m.define("LIMIT", Value::int(1));

    assert!(m.instance_method("run").is_some());
    assert!(m.instance_method("LIMIT").is_none());
    assert!(m.instance_method("missing").is_none());
}

#[test]
fn test_bag_methods_dispatch_through_class() {
    fn shout(call: &Call<'_>) -> MixinResult<Value> {
        let text = call.str_arg(0)?;
        Ok(Value::str(text.to_uppercase()))
    }

    let class = Class::build(
        "Shouter",
        [Mixin::from(MethodBag::new().method("shout", Method::new(shout)))],
    )
    .unwrap();
    let obj = class.instantiate(vec![]).unwrap();

    assert_eq!(obj.send("shout", vec![Value::str("hey")]).unwrap(), Value::str("HEY"));
    assert!(matches!(
        obj.send("shout", vec![Value::int(1)]),
        Err(MixinError::ArgumentError(_))
    ));
    assert!(matches!(
        class.module().own_member("shout"),
        Some(Member::Method(_))
    ));
}
