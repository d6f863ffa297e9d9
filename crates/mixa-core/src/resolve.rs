//! Resolution of effective methods onto method tables
//!
//! A [`Target`] is the table a consumer actually calls through. Resolving a
//! module copies the members of its whole ancestor chain onto its target,
//! most distant first, so the most specific definition of each name wins.
//! Members that call super are not copied raw; the table gets a
//! [`Resolved::Chained`] entry that re-enters dispatch on every call, which
//! keeps the super chain late-bound.
//!
//! Resolution cascades: re-resolving a module re-resolves every module that
//! includes it, transitively, so targets never go stale.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::method::Member;
use crate::module::{Module, WeakModule};

/// Method table entry
#[derive(Debug, Clone)]
pub enum Resolved {
    /// Member copied as is
    Plain(Member),
    /// Dispatches `name` through `module`'s ancestor chain when called
    Chained {
        /// Module whose chain is walked
        module: WeakModule,
        /// Method name
        name: String,
    },
}

impl Resolved {
    /// Whether writing `other` over `self` would change nothing
    pub fn same(&self, other: &Resolved) -> bool {
        match (self, other) {
            (Resolved::Plain(a), Resolved::Plain(b)) => a.same(b),
            (
                Resolved::Chained { module: ma, name: na },
                Resolved::Chained { module: mb, name: nb },
            ) => ma.ptr_eq(mb) && na == nb,
            _ => false,
        }
    }
}

#[derive(Default)]
struct TargetInner {
    entries: RefCell<FxHashMap<String, Resolved>>,
    revision: Cell<u64>,
}

/// Shared, externally owned method table
#[derive(Clone, Default)]
pub struct Target(Rc<TargetInner>);

impl Target {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for `name`
    pub fn get(&self, name: &str) -> Option<Resolved> {
        self.0.entries.borrow().get(name).cloned()
    }

    /// Whether `name` has an entry
    pub fn contains(&self, name: &str) -> bool {
        self.0.entries.borrow().contains_key(name)
    }

    /// Entry names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.entries.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.entries.borrow().len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.0.entries.borrow().is_empty()
    }

    /// Count of writes that actually changed an entry
    pub fn revision(&self) -> u64 {
        self.0.revision.get()
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Target) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Write an entry unless an identical one is already there
    fn store(&self, name: &str, entry: Resolved) {
        let mut entries = self.0.entries.borrow_mut();
        if entries.get(name).is_some_and(|current| current.same(&entry)) {
            return;
        }
        log::trace!("target write `{}`", name);
        entries.insert(name.to_string(), entry);
        self.0.revision.set(self.0.revision.get() + 1);
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("names", &self.names())
            .field("revision", &self.revision())
            .finish()
    }
}

impl Module {
    /// Re-resolve this module and everything that depends on it
    ///
    /// Clears the cached ancestor chain, resolves every live dependent, then
    /// copies onto this module's own target when it has one. Modules without
    /// a target only pass the change on.
    pub fn resolve(&self) {
        self.invalidate();
        for dependent in self.dependents().iter().rev() {
            dependent.resolve();
        }
        if let Some(target) = self.target() {
            self.resolve_onto(&target);
        }
    }

    /// Copy the effective members of this module's chain onto `target`
    ///
    /// The chain is folded first so each name is written at most once.
    pub fn resolve_onto(&self, target: &Target) {
        let mut effective: FxHashMap<String, Member> = FxHashMap::default();
        for ancestor in self.ancestors() {
            effective.extend(ancestor.own_members());
        }
        for (name, member) in effective {
            let entry = self.make(&name, member);
            target.store(&name, entry);
        }
    }

    /// Table entry for a member: chained when it calls super, raw otherwise
    fn make(&self, name: &str, member: Member) -> Resolved {
        match member {
            Member::Method(m) if m.calls_super() => Resolved::Chained {
                module: self.downgrade(),
                name: name.to_string(),
            },
            other => Resolved::Plain(other),
        }
    }
}
