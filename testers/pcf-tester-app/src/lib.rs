//! Diagnostic tester control
//!
//! The control logs every lifecycle call it receives (`init`, `updateView`,
//! `getOutputs`) into an event log and runs a persisted list of probes on
//! each one. Typed commands poke the host: signal actions, change outputs,
//! page the bound dataset, schedule output notifications.
//!
//! - [`control::Control`] is the control itself: store, reducer, timers
//! - [`sim_host::SimHost`] stands in for the hosting platform
//! - [`session::Session`] calls the control the way a host would
//! - [`view`] and [`run`] put it on a terminal

pub mod action;
pub mod command;
pub mod config;
pub mod control;
pub mod effect;
pub mod probe;
pub mod reducer;
pub mod run;
pub mod session;
pub mod sim_host;
pub mod state;
pub mod view;
