//! Effect-based state management
//!
//! A control never calls its host directly. Its reducer mutates local state
//! and returns declarative effects ("signal an action", "notify outputs
//! changed", "schedule a timer") that the driver then executes against the
//! host. This keeps every verb testable without a real host.
//!
//! # Overview
//!
//! ```ignore
//! fn reducer(state: &mut S, action: A, env: &Env) -> Result<DispatchResult<E>, ControlError>
//! ```
//!
//! `env` is read-only context for this dispatch (the host snapshot, the
//! current time). The `Result` carries deliberate faults back to the host.
//!
//! # Example
//!
//! ```ignore
//! use pcf_tester::{Action, DispatchResult, EffectStore};
//!
//! enum Effect {
//!     NotifyOutputChanged,
//! }
//!
//! #[derive(Clone, Debug, Action)]
//! enum Msg {
//!     Set { key: String, value: String },
//! }
//!
//! fn reducer(state: &mut Bag, msg: Msg, _env: &()) -> Result<DispatchResult<Effect>, ControlError> {
//!     match msg {
//!         Msg::Set { key, value } => {
//!             state.insert(key, value);
//!             Ok(DispatchResult::changed_with(Effect::NotifyOutputChanged))
//!         }
//!     }
//! }
//!
//! let mut store = EffectStore::new(Bag::default(), reducer);
//! let result = store.dispatch(Msg::Set { key: "a".into(), value: "b".into() }, &())?;
//! for effect in result.effects {
//!     // hand to the host
//! }
//! ```

use std::marker::PhantomData;

use crate::action::Action;
use crate::error::ControlError;
use crate::store::Middleware;

/// Result of dispatching an action to an effect-aware store.
///
/// `changed` means the view must be re-rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult<E> {
    /// Whether a refresh of the view was requested.
    pub changed: bool,
    /// Effects to be processed after dispatch, in emission order.
    pub effects: Vec<E>,
}

impl<E> Default for DispatchResult<E> {
    fn default() -> Self {
        Self::unchanged()
    }
}

impl<E> DispatchResult<E> {
    /// No refresh and no effects.
    #[inline]
    pub fn unchanged() -> Self {
        Self {
            changed: false,
            effects: vec![],
        }
    }

    /// Refresh requested, no effects.
    #[inline]
    pub fn changed() -> Self {
        Self {
            changed: true,
            effects: vec![],
        }
    }

    /// A single effect, no refresh.
    #[inline]
    pub fn effect(effect: E) -> Self {
        Self {
            changed: false,
            effects: vec![effect],
        }
    }

    /// Refresh requested with a single effect.
    #[inline]
    pub fn changed_with(effect: E) -> Self {
        Self {
            changed: true,
            effects: vec![effect],
        }
    }

    /// Add an effect to this result.
    #[inline]
    pub fn with(mut self, effect: E) -> Self {
        self.effects.push(effect);
        self
    }

    /// Append an effect in place.
    #[inline]
    pub fn push(&mut self, effect: E) {
        self.effects.push(effect);
    }

    /// Set the changed flag to true.
    #[inline]
    pub fn mark_changed(mut self) -> Self {
        self.changed = true;
        self
    }

    /// Fold another result into this one, keeping effect order.
    pub fn merge(&mut self, other: DispatchResult<E>) {
        self.changed |= other.changed;
        self.effects.extend(other.effects);
    }

    /// Returns true if there are any effects to process.
    #[inline]
    pub fn has_effects(&self) -> bool {
        !self.effects.is_empty()
    }
}

/// A reducer that can emit effects or fail.
///
/// Takes mutable state, the action and read-only dispatch context.
pub type EffectReducer<S, A, E, C> = fn(&mut S, A, &C) -> Result<DispatchResult<E>, ControlError>;

/// A store whose reducer emits effects.
///
/// On `Err` the state keeps whatever the reducer wrote before failing, the
/// same way a control that throws half way through `updateView` keeps the
/// rows it already logged.
pub struct EffectStore<S, A, E, C> {
    state: S,
    reducer: EffectReducer<S, A, E, C>,
    _marker: PhantomData<(A, E, C)>,
}

impl<S, A, E, C> EffectStore<S, A, E, C>
where
    A: Action,
{
    /// Create a new effect store with the given initial state and reducer.
    pub fn new(state: S, reducer: EffectReducer<S, A, E, C>) -> Self {
        Self {
            state,
            reducer,
            _marker: PhantomData,
        }
    }

    /// Get a reference to the current state.
    #[inline]
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Get a mutable reference to the state.
    ///
    /// Use sparingly - prefer dispatching actions for state changes.
    #[inline]
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// Dispatch an action with the given context.
    #[inline]
    pub fn dispatch(&mut self, action: A, ctx: &C) -> Result<DispatchResult<E>, ControlError> {
        (self.reducer)(&mut self.state, action, ctx)
    }
}

/// An effect store with middleware support.
///
/// Middleware sees every action before and after the reducer runs, and is
/// told about faults. It never sees effects.
pub struct EffectStoreWithMiddleware<S, A, E, C, M>
where
    A: Action,
    M: Middleware<A>,
{
    store: EffectStore<S, A, E, C>,
    middleware: M,
}

impl<S, A, E, C, M> EffectStoreWithMiddleware<S, A, E, C, M>
where
    A: Action,
    M: Middleware<A>,
{
    /// Create a new effect store with middleware.
    pub fn new(state: S, reducer: EffectReducer<S, A, E, C>, middleware: M) -> Self {
        Self {
            store: EffectStore::new(state, reducer),
            middleware,
        }
    }

    /// Get a reference to the current state.
    #[inline]
    pub fn state(&self) -> &S {
        self.store.state()
    }

    /// Get a mutable reference to the state.
    #[inline]
    pub fn state_mut(&mut self) -> &mut S {
        self.store.state_mut()
    }

    /// Get a reference to the middleware.
    #[inline]
    pub fn middleware(&self) -> &M {
        &self.middleware
    }

    /// Get a mutable reference to the middleware.
    #[inline]
    pub fn middleware_mut(&mut self) -> &mut M {
        &mut self.middleware
    }

    /// Dispatch an action through middleware and store.
    pub fn dispatch(&mut self, action: A, ctx: &C) -> Result<DispatchResult<E>, ControlError> {
        self.middleware.before(&action);
        match self.store.dispatch(action.clone(), ctx) {
            Ok(result) => {
                self.middleware.after(&action, result.changed);
                Ok(result)
            }
            Err(err) => {
                self.middleware.fault(&action, &err);
                Err(err)
            }
        }
    }
}
