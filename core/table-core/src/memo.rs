//! FILENAME: core/table-core/src/memo.rs
//! API assignment and dependency-tracked memoization.
//!
//! Every derived accessor on a table, column or row is registered by name in
//! that entity's `ApiRegistry`. Memoized accessors get a `Memo` slot that keeps
//! the last dependency tuple and result:
//! - dependencies are compared element-wise (`Rc` by pointer, scalars by value),
//! - an unchanged tuple returns a clone of the cached result, so results held in
//!   an `Rc` come back reference-identical,
//! - nothing else (no counters, no clocks) decides whether to recompute.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::error::{Result, TableError};
use crate::logging::{log_debug, log_warn};

// ============================================================================
// DEPENDENCIES
// ============================================================================

/// A single memo dependency.
pub trait Dep {
    fn same(&self, other: &Self) -> bool;
}

impl<T: ?Sized> Dep for Rc<T> {
    fn same(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

impl<T: Dep> Dep for Option<T> {
    fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.same(b),
            (None, None) => true,
            _ => false,
        }
    }
}

macro_rules! value_deps {
    ($($t:ty),*) => {
        $(
            impl Dep for $t {
                fn same(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

value_deps!(bool, u32, u64, usize, i32, i64, String, &'static str);

impl Dep for f64 {
    fn same(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

/// A dependency tuple. Implemented for `()` and tuples of up to six `Dep`s.
pub trait Deps: 'static {
    fn same_as(&self, previous: &Self) -> bool;
}

impl Deps for () {
    fn same_as(&self, _previous: &Self) -> bool {
        true
    }
}

macro_rules! tuple_deps {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Dep + 'static),+> Deps for ($($name,)+) {
            fn same_as(&self, previous: &Self) -> bool {
                true $(&& self.$idx.same(&previous.$idx))+
            }
        }
    };
}

tuple_deps!(A: 0);
tuple_deps!(A: 0, B: 1);
tuple_deps!(A: 0, B: 1, C: 2);
tuple_deps!(A: 0, B: 1, C: 2, D: 3);
tuple_deps!(A: 0, B: 1, C: 2, D: 3, E: 4);
tuple_deps!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);

// ============================================================================
// MEMO
// ============================================================================

/// A single-entry cache keyed by a dependency tuple.
pub struct Memo<D, R> {
    label: &'static str,
    debug: bool,
    cache: RefCell<Option<(D, R)>>,
}

impl<D: Deps, R: Clone> Memo<D, R> {
    pub fn new(label: &'static str) -> Self {
        Self::with_debug(label, false)
    }

    /// A memo that logs every recomputation at debug level.
    pub fn with_debug(label: &'static str, debug: bool) -> Self {
        Memo {
            label,
            debug,
            cache: RefCell::new(None),
        }
    }

    /// Returns the cached result when `deps` matches the previous tuple,
    /// otherwise computes, stores and returns a new one.
    ///
    /// The cache is not borrowed while `compute` runs, so `compute` may read
    /// other memos.
    pub fn get(&self, deps: D, compute: impl FnOnce(&D) -> R) -> R {
        if let Some((previous, value)) = self.cache.borrow().as_ref() {
            if deps.same_as(previous) {
                return value.clone();
            }
        }
        let value = compute(&deps);
        if self.debug {
            log_debug!("MEMO", "{} recomputed", self.label);
        }
        *self.cache.borrow_mut() = Some((deps, value.clone()));
        value
    }
}

impl<D, R> fmt::Debug for Memo<D, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo")
            .field("label", &self.label)
            .field("cached", &self.cache.borrow().is_some())
            .finish()
    }
}

// ============================================================================
// API REGISTRY
// ============================================================================

/// Declaration of one derived accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiDef {
    pub name: &'static str,
    pub memoized: bool,
}

impl ApiDef {
    /// An accessor whose result is cached against its dependency tuple.
    pub const fn memo(name: &'static str) -> Self {
        ApiDef { name, memoized: true }
    }

    /// An accessor recomputed on every call.
    pub const fn plain(name: &'static str) -> Self {
        ApiDef {
            name,
            memoized: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Assigned {
    def: ApiDef,
    owner: &'static str,
}

/// The set of APIs a feature has attached to one entity, with their memo slots.
///
/// Declarations are shared between registries created with [`ApiRegistry::fresh`];
/// memo slots never are.
pub struct ApiRegistry {
    entity: &'static str,
    debug: bool,
    defs: Rc<Vec<Assigned>>,
    slots: RefCell<SmallVec<[Option<Rc<dyn Any>>; 4]>>,
}

impl ApiRegistry {
    pub fn new(entity: &'static str, debug: bool) -> Self {
        ApiRegistry {
            entity,
            debug,
            defs: Rc::new(Vec::new()),
            slots: RefCell::new(SmallVec::new()),
        }
    }

    /// Attaches `apis` on behalf of the feature `owner`.
    ///
    /// An API name can only be assigned once per entity.
    pub fn assign_apis(&mut self, owner: &'static str, apis: &[ApiDef]) -> Result<()> {
        let defs = Rc::make_mut(&mut self.defs);
        for api in apis {
            if let Some(existing) = defs.iter().find(|a| a.def.name == api.name) {
                return Err(TableError::ConflictingApi {
                    api: api.name,
                    first: existing.owner,
                    second: owner,
                });
            }
            defs.push(Assigned { def: *api, owner });
        }
        self.slots.get_mut().clear();
        Ok(())
    }

    pub fn has(&self, name: &str) -> bool {
        self.defs.iter().any(|a| a.def.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.defs.iter().map(|a| a.def.name)
    }

    /// A registry with the same declarations and empty memo slots.
    pub fn fresh(&self) -> Self {
        ApiRegistry {
            entity: self.entity,
            debug: self.debug,
            defs: Rc::clone(&self.defs),
            slots: RefCell::new(SmallVec::new()),
        }
    }

    /// Evaluates the API `name`.
    ///
    /// Returns `None` when no feature assigned it. Plain APIs are computed on
    /// every call; memoized APIs go through their slot.
    pub fn memo<D: Deps, R: Clone + 'static>(
        &self,
        name: &'static str,
        deps: D,
        compute: impl FnOnce(&D) -> R,
    ) -> Option<R> {
        let position = self.defs.iter().position(|a| a.def.name == name)?;
        if !self.defs[position].def.memoized {
            return Some(compute(&deps));
        }
        let memo = self.slot::<D, R>(position, name);
        Some(memo.get(deps, compute))
    }

    fn slot<D: Deps, R: Clone + 'static>(
        &self,
        position: usize,
        name: &'static str,
    ) -> Rc<Memo<D, R>> {
        let mut slots = self.slots.borrow_mut();
        if slots.len() < self.defs.len() {
            slots.resize(self.defs.len(), None);
        }
        if let Some(existing) = slots[position].clone() {
            match existing.downcast::<Memo<D, R>>() {
                Ok(memo) => return memo,
                Err(_) => log_warn!(
                    "MEMO",
                    "{} api '{}' read with a different signature, cache reset",
                    self.entity,
                    name
                ),
            }
        }
        let memo = Rc::new(Memo::with_debug(name, self.debug));
        slots[position] = Some(Rc::clone(&memo) as Rc<dyn Any>);
        memo
    }
}

impl Clone for ApiRegistry {
    fn clone(&self) -> Self {
        self.fresh()
    }
}

impl fmt::Debug for ApiRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRegistry")
            .field("entity", &self.entity)
            .field("apis", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_memo_reuses_result_for_same_rc() {
        let memo: Memo<(Rc<Vec<i32>>,), Rc<i32>> = Memo::new("sum");
        let input = Rc::new(vec![1, 2, 3]);
        let calls = Cell::new(0);

        let first = memo.get((Rc::clone(&input),), |(v,)| {
            calls.set(calls.get() + 1);
            Rc::new(v.iter().sum())
        });
        let second = memo.get((Rc::clone(&input),), |(v,)| {
            calls.set(calls.get() + 1);
            Rc::new(v.iter().sum())
        });

        assert_eq!(calls.get(), 1);
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_memo_recomputes_for_equal_but_distinct_rc() {
        let memo: Memo<(Rc<Vec<i32>>,), Rc<i32>> = Memo::new("sum");
        let first = memo.get((Rc::new(vec![1]),), |(v,)| Rc::new(v[0]));
        let second = memo.get((Rc::new(vec![1]),), |(v,)| Rc::new(v[0]));
        assert!(!Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_memo_compares_scalars_by_value() {
        let memo: Memo<(usize, bool), Rc<String>> = Memo::new("label");
        let a = memo.get((1, true), |_| Rc::new("x".to_string()));
        let b = memo.get((1, true), |_| Rc::new("y".to_string()));
        let c = memo.get((2, true), |_| Rc::new("z".to_string()));
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(*c, "z");
    }

    #[test]
    fn test_registry_rejects_double_assignment() {
        let mut registry = ApiRegistry::new("table", false);
        registry
            .assign_apis("First", &[ApiDef::memo("rows")])
            .unwrap();
        let err = registry
            .assign_apis("Second", &[ApiDef::plain("rows")])
            .unwrap_err();
        assert_eq!(
            err,
            TableError::ConflictingApi {
                api: "rows",
                first: "First",
                second: "Second",
            }
        );
    }

    #[test]
    fn test_registry_unassigned_api_is_none() {
        let registry = ApiRegistry::new("row", false);
        assert!(registry.memo("missing", (), |_| 1).is_none());
    }

    #[test]
    fn test_fresh_registry_shares_declarations_not_slots() {
        let mut registry = ApiRegistry::new("row", false);
        registry
            .assign_apis("Core", &[ApiDef::memo("cells")])
            .unwrap();
        let a = registry.memo("cells", (), |_| Rc::new(1)).unwrap();
        let fresh = registry.fresh();
        assert!(fresh.has("cells"));
        let b = fresh.memo("cells", (), |_| Rc::new(1)).unwrap();
        assert!(!Rc::ptr_eq(&a, &b));
    }
}
