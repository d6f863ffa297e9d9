//! Object model and class construction
//!
//! A [`Class`] pairs a module with the method table it resolves onto. Its
//! instances are [`Object`]s: a per-object field map plus the shared table,
//! which tracks every later change to the class or its mixins.

use std::cell::RefCell;
use std::fmt;

use rustc_hash::FxHashMap;

use crate::dispatch::Call;
use crate::error::{MixinError, MixinResult};
use crate::method::{Member, Mixin};
use crate::module::Module;
use crate::resolve::{Resolved, Target};
use crate::value::Value;

/// Method run by [`Class::instantiate`] when defined
pub const INITIALIZE: &str = "initialize";

/// Object instance
pub struct Object {
    /// Module the object was built from
    module: Module,
    /// Method table calls go through
    table: Target,
    /// Field values
    fields: RefCell<FxHashMap<String, Value>>,
}

impl Object {
    /// Create an object calling through `table`, built from `module`
    ///
    /// The object keeps `module` alive, so chained entries in the table can
    /// always reach it.
    pub fn with_table(module: Module, table: Target) -> Self {
        Self {
            module,
            table,
            fields: RefCell::new(FxHashMap::default()),
        }
    }

    /// Module the object was built from
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Method table the object calls through
    pub fn table(&self) -> &Target {
        &self.table
    }

    /// Get a field value by name
    pub fn get_field(&self, name: &str) -> Option<Value> {
        self.fields.borrow().get(name).cloned()
    }

    /// Set a field value by name
    pub fn set_field(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.borrow_mut().insert(name.into(), value.into());
    }

    /// Modify a field in place, starting from null when it is unset
    pub fn update_field<R>(&self, name: &str, f: impl FnOnce(&mut Value) -> R) -> R {
        let mut fields = self.fields.borrow_mut();
        f(fields.entry(name.to_string()).or_default())
    }

    /// Get number of fields
    pub fn field_count(&self) -> usize {
        self.fields.borrow().len()
    }

    /// Whether the table has an entry for `name`
    pub fn responds_to(&self, name: &str) -> bool {
        self.table.contains(name)
    }

    /// Read a constant member through the table
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.table.get(name)? {
            Resolved::Plain(Member::Value(v)) => Some(v),
            _ => None,
        }
    }

    /// Call `name` through the table
    pub fn send(&self, name: &str, args: Vec<Value>) -> MixinResult<Value> {
        match self.table.get(name) {
            Some(Resolved::Plain(Member::Method(method))) => {
                method.invoke(&Call::plain(self, name, args))
            }
            Some(Resolved::Plain(Member::Value(_))) => Err(MixinError::NotCallable {
                name: name.to_string(),
                receiver: self.to_string(),
            }),
            Some(Resolved::Chained { module, name: method }) => match module.upgrade() {
                Some(module) => module.dispatch(self, &method, args),
                None => Err(MixinError::DetachedMethod { method }),
            },
            None => Err(MixinError::NoMethod {
                method: name.to_string(),
                receiver: self.to_string(),
            }),
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("module", &self.module.name())
            .field("fields", &self.fields.borrow())
            .finish()
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<{}>", self.module.name())
    }
}

/// Module paired with its own method table
#[derive(Debug, Clone)]
pub struct Class {
    module: Module,
    target: Target,
}

impl Class {
    /// Create a class with no methods
    pub fn new(name: impl Into<String>) -> Self {
        let target = Target::new();
        Self {
            module: Module::with_target(name, target.clone()),
            target,
        }
    }

    /// Create a class and include each mixin in order
    pub fn build(
        name: impl Into<String>,
        mixins: impl IntoIterator<Item = Mixin>,
    ) -> MixinResult<Self> {
        let class = Self::new(name);
        for mixin in mixins {
            class.include(mixin)?;
        }
        Ok(class)
    }

    /// Class name
    pub fn name(&self) -> &str {
        self.module.name()
    }

    /// Backing module
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Method table shared by all instances
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Mix a module or method bag into the class
    pub fn include(&self, mixin: impl Into<Mixin>) -> MixinResult<()> {
        self.module.include(mixin)
    }

    /// Define a member directly on the class
    pub fn define(&self, name: impl Into<String>, member: impl Into<Member>) {
        self.module.define(name, member)
    }

    /// Create an instance, running `initialize` with `args` when defined
    pub fn instantiate(&self, args: Vec<Value>) -> MixinResult<Object> {
        let object = Object::with_table(self.module.clone(), self.target.clone());
        if object.responds_to(INITIALIZE) {
            object.send(INITIALIZE, args)?;
        }
        Ok(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::{Method, MethodBag};

    #[test]
    fn test_object_field_access() {
        let obj = Class::new("Point").instantiate(vec![]).unwrap();
        obj.set_field("x", 10);
        obj.set_field("y", Value::bool(true));

        assert_eq!(obj.get_field("x"), Some(Value::int(10)));
        assert_eq!(obj.get_field("y"), Some(Value::bool(true)));
        assert_eq!(obj.get_field("z"), None);
        assert_eq!(obj.field_count(), 2);
    }

    #[test]
    fn test_update_field_starts_from_null() {
        let obj = Class::new("Bag").instantiate(vec![]).unwrap();
        obj.update_field("items", |v| {
            assert!(v.is_null());
            *v = Value::list([Value::int(1)]);
        });
        obj.update_field("items", |v| v.as_list_mut().unwrap().push(Value::int(2)));
        assert_eq!(
            obj.get_field("items"),
            Some(Value::list([Value::int(1), Value::int(2)]))
        );
    }

    #[test]
    fn test_initialize_runs_with_args() {
        let class = Class::build(
            "Counter",
            [Mixin::from(MethodBag::new().method(
                INITIALIZE,
                Method::new(|call| {
                    call.receiver().set_field("count", call.arg(0).clone());
                    Ok(Value::null())
                }),
            ))],
        )
        .unwrap();

        let obj = class.instantiate(vec![Value::int(5)]).unwrap();
        assert_eq!(obj.get_field("count"), Some(Value::int(5)));
    }

    #[test]
    fn test_send_constant_is_error() {
        let class = Class::new("Consts");
        class.define("LIMIT", Value::int(3));
        let obj = class.instantiate(vec![]).unwrap();

        assert_eq!(obj.get("LIMIT"), Some(Value::int(3)));
        assert!(matches!(
            obj.send("LIMIT", vec![]),
            Err(MixinError::NotCallable { .. })
        ));
        assert!(matches!(
            obj.send("missing", vec![]),
            Err(MixinError::NoMethod { .. })
        ));
    }

    #[test]
    fn test_plain_method_cannot_call_super() {
        let class = Class::new("Plain");
        class.define("run", Method::new(|call| call.call_super(&[])));
        let obj = class.instantiate(vec![]).unwrap();

        assert!(matches!(
            obj.send("run", vec![]),
            Err(MixinError::InvalidSuperCall { .. })
        ));
    }

    #[test]
    fn test_display() {
        let obj = Class::new("Point").instantiate(vec![]).unwrap();
        assert_eq!(obj.to_string(), "#<Point>");
    }
}
