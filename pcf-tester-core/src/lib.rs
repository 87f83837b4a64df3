//! Core traits and types for pcf-tester
//!
//! This crate provides the building blocks for a diagnostic control that
//! exercises a hosting platform, following a Redux/Elm-inspired architecture.
//!
//! # Core Concepts
//!
//! - **Action**: Lifecycle calls and typed commands that drive the control
//! - **EffectStore**: State container whose reducer returns host effects
//! - **Host**: The callbacks a control may ask its host to perform
//! - **TimerQueue**: Deferred actions against an injectable clock
//! - **ModeStore**: The persisted, comma-separated probe list
//! - **Component**: Pure UI elements that render based on props
//!
//! # Basic Example
//!
//! ```ignore
//! use pcf_tester_core::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! enum Msg {
//!     Add(u32),
//! }
//!
//! fn reducer(state: &mut u32, msg: Msg, _env: &()) -> Result<DispatchResult<HostCall>, ControlError> {
//!     match msg {
//!         Msg::Add(n) => {
//!             *state += n;
//!             Ok(DispatchResult::changed_with(HostCall::NotifyOutputChanged))
//!         }
//!     }
//! }
//!
//! let mut store = EffectStore::new(0, reducer);
//! let result = store.dispatch(Msg::Add(3), &())?;
//! for call in result.effects {
//!     call.apply(&mut host);
//! }
//! ```
//!
//! # Run Loop
//!
//! The driver owns three sources of work and `select!`s over them: terminal
//! events from [`spawn_event_poller`], the earliest deadline in a
//! [`TimerQueue`], and a [`CancellationToken`](tokio_util::sync::CancellationToken)
//! for shutdown. Every source ends in a dispatch; nothing else touches state.

pub mod action;
pub mod component;
pub mod effect;
pub mod error;
pub mod event;
pub mod event_log;
pub mod host;
pub mod mode;
pub mod poller;
pub mod scheduler;
pub mod store;
pub mod testing;

// Core trait exports
pub use action::{Action, ActionCategory, ActionSummary};
pub use component::Component;

// Error exports
pub use error::{ControlError, ModeStoreError};

// Event system exports
pub use event::EventKind;
pub use poller::{spawn_event_poller, PollerConfig, RawEvent};

// Store exports
pub use store::{LoggingMiddleware, Middleware};

// Effect exports
pub use effect::{DispatchResult, EffectReducer, EffectStore, EffectStoreWithMiddleware};

// Host model exports
pub use host::{
    Column, ControlState, DataSet, Host, HostCall, HostContext, Paging, Parameters, Record,
    Viewport,
};

// Log, mode and timer exports
pub use event_log::{EventCounts, EventLog, LogEventRow};
pub use mode::{FileModeStore, MemoryModeStore, ModeStore, DEFAULT_MODE, MODE_KEY};
pub use scheduler::{Clock, ManualClock, SystemClock, TimerQueue};

// Re-export ratatui types for convenience
pub use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    Frame,
};

// Testing exports
pub use testing::{
    buffer_to_string_plain, char_key, key, key_event, typed, RecordingHost, RenderHarness,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{Action, ActionCategory, ActionSummary};
    pub use crate::component::Component;
    pub use crate::effect::{
        DispatchResult, EffectReducer, EffectStore, EffectStoreWithMiddleware,
    };
    pub use crate::error::{ControlError, ModeStoreError};
    pub use crate::event::EventKind;
    pub use crate::event_log::{EventCounts, EventLog, LogEventRow};
    pub use crate::host::{ControlState, DataSet, Host, HostCall, HostContext};
    pub use crate::mode::{FileModeStore, MemoryModeStore, ModeStore};
    pub use crate::poller::{spawn_event_poller, PollerConfig, RawEvent};
    pub use crate::scheduler::{Clock, ManualClock, SystemClock, TimerQueue};
    pub use crate::store::{LoggingMiddleware, Middleware};

    // Re-export ratatui types
    pub use ratatui::{
        layout::Rect,
        style::{Color, Modifier, Style},
        text::{Line, Span, Text},
        Frame,
    };
}
