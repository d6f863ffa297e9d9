//! Module store and linearization
//!
//! A [`Module`] owns a table of methods, the ordered list of modules it
//! includes and weak back-references to the modules that include it. Its
//! ancestor chain is computed lazily and cached until the module or
//! anything it includes changes.
//!
//! # Ancestor order
//!
//! ```text
//!        D            A includes [B, C]
//!       / \           B includes [D]
//!      B   C          C includes [D]
//!       \ /
//!        A            A.ancestors() == [D, B, C, A]
//! ```
//!
//! The most distant ancestor comes first and the module itself last. A
//! module shared by several branches appears once, at the position of its
//! first occurrence.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;

use crate::error::{MixinError, MixinResult};
use crate::method::{Member, Method, MethodBag, Mixin};
use crate::resolve::Target;

/// Lifecycle callback: `(source, includer)`
pub type Hook = Rc<dyn Fn(&Module, &Module)>;

/// Receives method definition events
pub trait MethodObserver {
    /// Called after a callable member named `name` was defined
    fn method_defined(&self, name: &str, owner: &Module);
}

impl<F: Fn(&str, &Module)> MethodObserver for F {
    fn method_defined(&self, name: &str, owner: &Module) {
        self(name, owner)
    }
}

/// Optional context threaded through `define_with` and `include_with`
#[derive(Clone, Copy, Default)]
pub struct DefineContext<'a> {
    /// Notified of each callable member defined
    pub observer: Option<&'a dyn MethodObserver>,
    /// Module reported to hooks and observers instead of the receiver
    pub includer: Option<&'a Module>,
    /// Set when the inclusion was requested through `extend`
    pub extended: Option<&'a Module>,
    /// Force re-resolution even when the mixin turns out to be empty
    pub resolve: bool,
}

#[derive(Default)]
struct Hooks {
    included: Option<Hook>,
    extended: Option<Hook>,
}

struct ModuleInner {
    name: String,
    methods: RefCell<FxHashMap<String, Member>>,
    included: RefCell<Vec<Module>>,
    dependents: RefCell<Vec<WeakModule>>,
    target: RefCell<Option<Target>>,
    ancestors: RefCell<Option<Vec<Module>>>,
    extension: RefCell<Option<Module>>,
    hooks: RefCell<Hooks>,
}

/// Shared handle to a module; clones refer to the same module
#[derive(Clone)]
pub struct Module(Rc<ModuleInner>);

/// Non-owning module reference
#[derive(Clone)]
pub struct WeakModule(Weak<ModuleInner>);

impl WeakModule {
    /// Get the module if it is still alive
    pub fn upgrade(&self) -> Option<Module> {
        self.0.upgrade().map(Module)
    }

    /// Whether both references point at the same module
    pub fn ptr_eq(&self, other: &WeakModule) -> bool {
        self.0.ptr_eq(&other.0)
    }
}

impl fmt::Debug for WeakModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(m) => write!(f, "WeakModule({})", m.name()),
            None => write!(f, "WeakModule(<dropped>)"),
        }
    }
}

impl Module {
    /// Create an empty module
    pub fn new(name: impl Into<String>) -> Self {
        Module(Rc::new(ModuleInner {
            name: name.into(),
            methods: RefCell::new(FxHashMap::default()),
            included: RefCell::new(Vec::new()),
            dependents: RefCell::new(Vec::new()),
            target: RefCell::new(None),
            ancestors: RefCell::new(None),
            extension: RefCell::new(None),
            hooks: RefCell::new(Hooks::default()),
        }))
    }

    /// Create an empty module whose effective methods are resolved onto `target`
    pub fn with_target(name: impl Into<String>, target: Target) -> Self {
        let module = Self::new(name);
        *module.0.target.borrow_mut() = Some(target);
        module
    }

    /// Create a module seeded with a method bag
    pub fn from_bag(name: impl Into<String>, bag: MethodBag) -> MixinResult<Self> {
        let module = Self::new(name);
        module.include(bag)?;
        Ok(module)
    }

    /// Module name
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Module) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Non-owning reference to this module
    pub fn downgrade(&self) -> WeakModule {
        WeakModule(Rc::downgrade(&self.0))
    }

    /// Method table this module resolves onto, if any
    pub fn target(&self) -> Option<Target> {
        self.0.target.borrow().clone()
    }

    /// Attach a resolution target and copy the effective methods onto it
    pub fn set_target(&self, target: Target) {
        *self.0.target.borrow_mut() = Some(target);
        self.resolve();
    }

    /// Member defined directly on this module
    pub fn own_member(&self, name: &str) -> Option<Member> {
        self.0.methods.borrow().get(name).cloned()
    }

    /// Names defined directly on this module, sorted
    pub fn own_member_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.methods.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    pub(crate) fn own_members(&self) -> Vec<(String, Member)> {
        self.0
            .methods
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Directly included modules, in inclusion order
    pub fn included_modules(&self) -> Vec<Module> {
        self.0.included.borrow().clone()
    }

    /// Live modules that directly include this one
    pub fn dependents(&self) -> Vec<Module> {
        self.0
            .dependents
            .borrow()
            .iter()
            .filter_map(WeakModule::upgrade)
            .collect()
    }

    /// Companion module holding extensions, if anything extended this module
    pub fn extension(&self) -> Option<Module> {
        self.0.extension.borrow().clone()
    }

    /// Callback fired when this module is included somewhere
    pub fn on_included(&self, hook: impl Fn(&Module, &Module) + 'static) {
        self.0.hooks.borrow_mut().included = Some(Rc::new(hook));
    }

    /// Callback fired when this module extends another module
    pub fn on_extended(&self, hook: impl Fn(&Module, &Module) + 'static) {
        self.0.hooks.borrow_mut().extended = Some(Rc::new(hook));
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Store a member under `name`, replacing any previous one
    ///
    /// Everything that depends on this module sees the change immediately.
    pub fn define(&self, name: impl Into<String>, member: impl Into<Member>) {
        self.define_with(name, member, DefineContext::default());
    }

    /// [`define`](Self::define) with an observer and notification target
    pub fn define_with(
        &self,
        name: impl Into<String>,
        member: impl Into<Member>,
        cx: DefineContext<'_>,
    ) {
        let name = name.into();
        let member = member.into();
        let callable = member.is_callable();
        self.0.methods.borrow_mut().insert(name.clone(), member);
        log::debug!("defined `{}` on {}", name, self.name());

        if callable {
            if let Some(observer) = cx.observer {
                observer.method_defined(&name, cx.includer.unwrap_or(self));
            }
        }
        self.resolve();
    }

    /// Mix a module or a method bag into this module
    pub fn include(&self, mixin: impl Into<Mixin>) -> MixinResult<()> {
        self.include_with(mixin, DefineContext::default())
    }

    /// [`include`](Self::include) with an observer and notification targets
    pub fn include_with(&self, mixin: impl Into<Mixin>, cx: DefineContext<'_>) -> MixinResult<()> {
        match mixin.into() {
            Mixin::Module(source) => self.include_module(source, cx),
            Mixin::Bag(bag) => {
                bag.validate()?;
                self.check_bag(&bag, cx)?;
                self.include_bag(bag, cx)
            }
        }
    }

    /// Mix `mixin` into this module's extension companion
    pub fn extend(&self, mixin: impl Into<Mixin>) -> MixinResult<()> {
        let extension = self.extension_or_create();
        extension.include_with(
            mixin,
            DefineContext {
                extended: Some(self),
                ..DefineContext::default()
            },
        )
    }

    fn extension_or_create(&self) -> Module {
        self.0
            .extension
            .borrow_mut()
            .get_or_insert_with(|| Module::new(format!("{}::extension", self.name())))
            .clone()
    }

    fn check_cycle(&self, source: &Module) -> MixinResult<()> {
        if source.ptr_eq(self) || source.includes(self) {
            log::debug!("rejected cyclic inclusion of {} into {}", source.name(), self.name());
            return Err(MixinError::CyclicInclusion {
                module: self.name().to_string(),
                included: source.name().to_string(),
            });
        }
        Ok(())
    }

    /// Reject a bag whose nested inclusions would close a cycle anywhere
    fn check_bag(&self, bag: &MethodBag, cx: DefineContext<'_>) -> MixinResult<()> {
        for nested in bag.includes() {
            match nested {
                Mixin::Module(source) => self.check_cycle(source)?,
                Mixin::Bag(inner) => self.check_bag(inner, cx)?,
            }
        }
        // A missing extension cannot be part of a cycle yet
        let Some(extension) = cx.includer.unwrap_or(self).extension() else {
            return Ok(());
        };
        for nested in bag.extends() {
            match nested {
                Mixin::Module(source) => extension.check_cycle(source)?,
                Mixin::Bag(inner) => extension.check_bag(inner, DefineContext::default())?,
            }
        }
        Ok(())
    }

    fn include_module(&self, source: Module, cx: DefineContext<'_>) -> MixinResult<()> {
        self.check_cycle(&source)?;
        if self.0.included.borrow().iter().any(|m| m.ptr_eq(&source)) {
            log::debug!("{} already includes {}", self.name(), source.name());
            if cx.resolve {
                self.resolve();
            }
            return Ok(());
        }

        self.0.included.borrow_mut().push(source.clone());
        source.0.dependents.borrow_mut().push(self.downgrade());
        log::debug!("{} includes {}", self.name(), source.name());

        let hooks = source.0.hooks.borrow();
        let (hook, host) = match cx.extended {
            Some(extended) => (hooks.extended.clone(), extended),
            None => (hooks.included.clone(), cx.includer.unwrap_or(self)),
        };
        drop(hooks);
        if let Some(hook) = hook {
            hook(&source, host);
        }

        self.resolve();
        Ok(())
    }

    fn include_bag(&self, bag: MethodBag, cx: DefineContext<'_>) -> MixinResult<()> {
        if bag.is_empty() {
            if cx.resolve {
                self.resolve();
            }
            return Ok(());
        }

        // Declarations first, so nested mixins sit below this bag's members
        for nested in bag.includes() {
            self.include_with(nested.clone(), cx)?;
        }
        let host = cx.includer.unwrap_or(self);
        for nested in bag.extends() {
            host.extend(nested.clone())?;
        }

        for (name, member) in bag.members() {
            self.define_with(name.clone(), member.clone(), cx);
        }
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Whether `other` is this module or reachable through its inclusions
    pub fn includes(&self, other: &Module) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        self.0.included.borrow().iter().any(|m| m.includes(other))
    }

    /// Linearized ancestor chain, most distant first, this module last
    pub fn ancestors(&self) -> Vec<Module> {
        if let Some(cached) = self.0.ancestors.borrow().as_ref() {
            return cached.clone();
        }
        let mut chain = Vec::new();
        self.collect_ancestors(&mut chain);
        *self.0.ancestors.borrow_mut() = Some(chain.clone());
        chain
    }

    fn collect_ancestors(&self, chain: &mut Vec<Module>) {
        for included in self.0.included.borrow().iter() {
            included.collect_ancestors(chain);
        }
        if !chain.iter().any(|m| m.ptr_eq(self)) {
            chain.push(self.clone());
        }
    }

    /// Most specific callable implementation of `name`
    pub fn instance_method(&self, name: &str) -> Option<Method> {
        match self.lookup(name).pop() {
            Some(Member::Method(m)) => Some(m),
            _ => None,
        }
    }

    pub(crate) fn invalidate(&self) {
        self.0.ancestors.borrow_mut().take();
    }
}

impl PartialEq for Module {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Module {}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Module({})", self.name())
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
