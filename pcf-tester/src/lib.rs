//! pcf-tester: a diagnostic control for exercising a hosting platform
//!
//! The control renders a live log of every lifecycle call it receives and
//! accepts typed commands that drive the host's callbacks. Everything the
//! host sees goes through a dispatched action and comes back as effects.
//!
//! # Example
//! ```ignore
//! use pcf_tester::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! #[action(rename_all = "camelCase")]
//! enum Lifecycle {
//!     #[action(category = "host")]
//!     Init,
//!     #[action(category = "host")]
//!     UpdateView,
//!     NotifyFired(u32),
//! }
//!
//! assert_eq!(Lifecycle::UpdateView.name(), "updateView");
//! assert!(Lifecycle::Init.is_host());
//! ```

// Re-export everything from core
pub use pcf_tester_core::*;

// Re-export derive macros
pub use pcf_tester_macros::Action;

/// Prelude for convenient imports
pub mod prelude {
    // Traits
    pub use pcf_tester_core::{Action, ActionCategory, ActionSummary, Component};

    // Event system
    pub use pcf_tester_core::{spawn_event_poller, EventKind, PollerConfig, RawEvent};

    // Store
    pub use pcf_tester_core::{
        ControlError, DispatchResult, EffectReducer, EffectStore, EffectStoreWithMiddleware,
        LoggingMiddleware, Middleware,
    };

    // Host, log, mode and timers
    pub use pcf_tester_core::{
        Clock, ControlState, DataSet, EventCounts, EventLog, FileModeStore, Host, HostCall,
        HostContext, ManualClock, MemoryModeStore, ModeStore, SystemClock, TimerQueue,
    };

    // Derive macros
    pub use pcf_tester_macros::Action;

    // Ratatui re-exports
    pub use pcf_tester_core::{Color, Frame, Line, Modifier, Rect, Span, Style, Text};
}
