//! Environment for identifier bindings
//!
//! An Environment is one scope in a chain. Each scope owns its bindings and
//! holds a weak link to its parent, so the chain only ever keeps itself alive
//! from the outside in: the REPL owns the root, and every call frame is owned
//! by the evaluator for the duration of one closure application.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;

use crate::interner::InternedSymbol;
use crate::language::Value;
use crate::modules::ModuleSource;

/// A single scope's identifier-to-value map
pub type Bindings = FxHashMap<InternedSymbol, Value>;

// ============================================================================
// Environment
// ============================================================================

struct EnvironmentState {
    data: Bindings,
    parent: Option<Weak<RefCell<EnvironmentState>>>,
    // Only set on a root
    modules: Option<Rc<dyn ModuleSource>>,
}

/// A handle on one scope. Cloning is an `Rc` increment; clones share the
/// same bindings.
#[derive(Clone)]
pub struct Environment {
    state: Rc<RefCell<EnvironmentState>>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Environment")
            .field("bindings", &state.data.len())
            .field("root", &state.parent.is_none())
            .finish()
    }
}

impl Environment {
    /// Create a new, empty root environment with no module source
    pub fn new() -> Self {
        Self::from_state(EnvironmentState {
            data: Bindings::default(),
            parent: None,
            modules: None,
        })
    }

    /// Create a root environment that resolves `import` through `modules`
    pub fn with_modules(modules: Rc<dyn ModuleSource>) -> Self {
        Self::from_state(EnvironmentState {
            data: Bindings::default(),
            parent: None,
            modules: Some(modules),
        })
    }

    /// Create a call frame holding `data` whose lookups fall back to `parent`
    pub fn frame(parent: &Environment, data: Bindings) -> Self {
        Self::from_state(EnvironmentState {
            data,
            parent: Some(Rc::downgrade(&parent.state)),
            modules: None,
        })
    }

    fn from_state(state: EnvironmentState) -> Self {
        Environment {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Look up `id` here, then up the parent chain
    pub fn get(&self, id: InternedSymbol) -> Option<Value> {
        let mut current = Some(Rc::clone(&self.state));
        while let Some(scope) = current {
            let state = scope.borrow();
            if let Some(value) = state.data.get(&id) {
                return Some(value.clone());
            }
            current = state.parent.as_ref().and_then(Weak::upgrade);
        }
        None
    }

    /// Bind `id` in this scope only
    pub fn put(&self, id: InternedSymbol, value: Value) {
        self.state.borrow_mut().data.insert(id, value);
    }

    /// Bind `id` in the root scope
    pub fn def(&self, id: InternedSymbol, value: Value) {
        self.root().put(id, value);
    }

    pub fn parent(&self) -> Option<Environment> {
        let state = self.state.borrow();
        state
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|state| Environment { state })
    }

    /// The outermost scope reachable from here
    pub fn root(&self) -> Environment {
        let mut env = self.clone();
        while let Some(parent) = env.parent() {
            env = parent;
        }
        env
    }

    /// The module source of the root scope, if one was configured
    pub fn modules(&self) -> Option<Rc<dyn ModuleSource>> {
        self.root().state.borrow().modules.clone()
    }

    /// A copy of this scope's own bindings, without the parents'
    pub fn local_bindings(&self) -> Bindings {
        self.state.borrow().data.clone()
    }
}
