//! Methods, members and mixins
//!
//! A module's method table maps names to [`Member`]s. A member is either a
//! callable [`Method`] or a plain [`Value`] constant. Mixins come in two
//! shapes, chosen by whoever produces them: a whole [`Module`], which is
//! linked into the inclusion graph, or a [`MethodBag`], whose members are
//! copied into the including module.

use std::fmt;
use std::rc::Rc;

use crate::dispatch::Call;
use crate::error::{MixinError, MixinResult};
use crate::module::Module;
use crate::value::Value;

/// Method body signature
pub type MethodFn = dyn Fn(&Call<'_>) -> MixinResult<Value>;

/// Names a bag cannot use for members; they carry declarations instead
const RESERVED_NAMES: [&str; 2] = ["include", "extend"];

/// Callable implementation
///
/// Whether the body calls `call_super` cannot be read off a closure, so the
/// producer declares it: [`Method::new`] for plain bodies, which are copied
/// onto method tables unwrapped, and [`Method::with_super`] for bodies that
/// delegate, which are routed through the call-super protocol.
#[derive(Clone)]
pub struct Method {
    func: Rc<MethodFn>,
    calls_super: bool,
}

impl Method {
    /// Create a plain method that never calls super
    pub fn new(func: impl Fn(&Call<'_>) -> MixinResult<Value> + 'static) -> Self {
        Self {
            func: Rc::new(func),
            calls_super: false,
        }
    }

    /// Create a method that may call `call_super`
    pub fn with_super(func: impl Fn(&Call<'_>) -> MixinResult<Value> + 'static) -> Self {
        Self {
            func: Rc::new(func),
            calls_super: true,
        }
    }

    /// Whether the body was declared as calling super
    pub fn calls_super(&self) -> bool {
        self.calls_super
    }

    /// Identity comparison
    pub fn same(&self, other: &Method) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }

    #[inline]
    pub(crate) fn invoke(&self, call: &Call<'_>) -> MixinResult<Value> {
        (self.func)(call)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("ptr", &Rc::as_ptr(&self.func).cast::<()>())
            .field("calls_super", &self.calls_super)
            .finish()
    }
}

/// Entry of a module's own method table
#[derive(Debug, Clone)]
pub enum Member {
    /// Callable implementation
    Method(Method),
    /// Plain value; stored and resolved, never dispatched
    Value(Value),
}

impl Member {
    /// Whether dispatch can invoke this member
    pub fn is_callable(&self) -> bool {
        matches!(self, Member::Method(_))
    }

    /// Get the method if this member is callable
    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Member::Method(m) => Some(m),
            Member::Value(_) => None,
        }
    }

    /// Get the value if this member is a constant
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Member::Value(v) => Some(v),
            Member::Method(_) => None,
        }
    }

    /// Identity for methods, equality for values
    pub fn same(&self, other: &Member) -> bool {
        match (self, other) {
            (Member::Method(a), Member::Method(b)) => a.same(b),
            (Member::Value(a), Member::Value(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Method> for Member {
    fn from(m: Method) -> Self {
        Member::Method(m)
    }
}

impl From<Value> for Member {
    fn from(v: Value) -> Self {
        Member::Value(v)
    }
}

/// Plain bag of named members plus nested inclusion requests
///
/// Including a bag first processes its `include` and `extend` requests, in
/// declaration order, and then defines its members one by one.
#[derive(Debug, Clone, Default)]
pub struct MethodBag {
    members: Vec<(String, Member)>,
    includes: Vec<Mixin>,
    extends: Vec<Mixin>,
}

impl MethodBag {
    /// Create an empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a method
    pub fn method(mut self, name: impl Into<String>, method: Method) -> Self {
        self.members.push((name.into(), Member::Method(method)));
        self
    }

    /// Add a plain value member
    pub fn constant(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members.push((name.into(), Member::Value(value.into())));
        self
    }

    /// Request inclusion of another mixin before this bag's members are added
    pub fn include(mut self, mixin: impl Into<Mixin>) -> Self {
        self.includes.push(mixin.into());
        self
    }

    /// Request extension of the includer with another mixin
    pub fn extend(mut self, mixin: impl Into<Mixin>) -> Self {
        self.extends.push(mixin.into());
        self
    }

    /// Members in declaration order
    pub fn members(&self) -> &[(String, Member)] {
        &self.members
    }

    /// Nested inclusion requests
    pub fn includes(&self) -> &[Mixin] {
        &self.includes
    }

    /// Nested extension requests
    pub fn extends(&self) -> &[Mixin] {
        &self.extends
    }

    /// Whether the bag would change nothing
    pub fn is_empty(&self) -> bool {
        self.members.is_empty() && self.includes.is_empty() && self.extends.is_empty()
    }

    /// Check this bag and every nested bag before anything is mutated
    pub(crate) fn validate(&self) -> MixinResult<()> {
        for (name, _) in &self.members {
            if name.is_empty() {
                return Err(MixinError::MalformedMixin {
                    reason: "member with an empty name".to_string(),
                });
            }
            if RESERVED_NAMES.contains(&name.as_str()) {
                return Err(MixinError::MalformedMixin {
                    reason: format!("`{}` is reserved for inclusion declarations", name),
                });
            }
        }
        for nested in self.includes.iter().chain(&self.extends) {
            if let Mixin::Bag(bag) = nested {
                bag.validate()?;
            }
        }
        Ok(())
    }
}

/// Source of an inclusion
#[derive(Debug, Clone)]
pub enum Mixin {
    /// Linked into the inclusion graph
    Module(Module),
    /// Members copied into the includer
    Bag(MethodBag),
}

impl From<Module> for Mixin {
    fn from(m: Module) -> Self {
        Mixin::Module(m)
    }
}

impl From<&Module> for Mixin {
    fn from(m: &Module) -> Self {
        Mixin::Module(m.clone())
    }
}

impl From<MethodBag> for Mixin {
    fn from(bag: MethodBag) -> Self {
        Mixin::Bag(bag)
    }
}
