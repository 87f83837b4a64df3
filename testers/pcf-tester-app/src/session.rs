//! One control mounted in the simulated host
//!
//! A host decides when to call the control; [`Session`] plays that part.
//! After every input it settles: outputs the control announced are read and
//! fed back, page loads complete, and the view is updated until nothing is
//! left pending.

use std::time::Duration;

use pcf_tester::{Clock, ControlError, ControlState, ModeStore};

use crate::control::Control;
use crate::sim_host::SimHost;

/// Upper bound on host round-trips per settle. A control that keeps
/// announcing new outputs on every view update would otherwise spin.
const MAX_SETTLE_CYCLES: usize = 16;

pub struct Session<M, K> {
    control: Control<M, K>,
    host: SimHost,
    fault: Option<String>,
    fault_count: u32,
}

impl<M: ModeStore, K: Clock> Session<M, K> {
    pub fn new(control: Control<M, K>, host: SimHost) -> Self {
        Self {
            control,
            host,
            fault: None,
            fault_count: 0,
        }
    }

    pub fn control(&self) -> &Control<M, K> {
        &self.control
    }

    pub fn host(&self) -> &SimHost {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut SimHost {
        &mut self.host
    }

    /// Message of the last failed lifecycle call, cleared by the next
    /// successful view update.
    pub fn fault(&self) -> Option<&str> {
        self.fault.as_deref()
    }

    pub fn fault_count(&self) -> u32 {
        self.fault_count
    }

    pub fn next_timer_in(&self) -> Option<Duration> {
        self.control.next_timer_in()
    }

    /// Mount the control: `init`, then the first view update.
    pub fn start(&mut self, control_state: Option<ControlState>) -> bool {
        let changed = match self.control.init(&mut self.host, control_state) {
            Ok(changed) => changed,
            Err(error) => {
                self.report("init", error);
                true
            }
        };
        self.host.request_update();
        self.settle() || changed
    }

    /// Run one command line typed into the control.
    pub fn command(&mut self, line: &str) -> bool {
        let changed = match self.control.on_command(line, &mut self.host) {
            Ok(changed) => changed,
            Err(error) => {
                self.report("command", error);
                true
            }
        };
        self.settle() || changed
    }

    /// Fire due timers.
    pub fn tick(&mut self) -> bool {
        let changed = match self.control.fire_due(&mut self.host) {
            Ok(changed) => changed,
            Err(error) => {
                self.report("timer", error);
                true
            }
        };
        self.settle() || changed
    }

    pub fn resize(&mut self, width: u16, height: u16) -> bool {
        self.host.resize(i32::from(width), i32::from(height));
        self.settle()
    }

    /// Drain pending host work. Returns whether anything ran.
    pub fn settle(&mut self) -> bool {
        let mut changed = false;
        for _ in 0..MAX_SETTLE_CYCLES {
            if self.host.take_outputs_pending() {
                match self.control.get_outputs(&mut self.host) {
                    Ok(outputs) => self.host.receive_outputs(outputs),
                    Err(error) => self.report("getOutputs", error),
                }
                changed = true;
            } else if self.host.take_update_pending() {
                match self.control.update_view(&mut self.host) {
                    Ok(_) => self.fault = None,
                    Err(error) => self.report("updateView", error),
                }
                self.host.end_cycle();
                changed = true;
            } else if !self.host.complete_load() {
                return changed;
            }
        }
        tracing::warn!(cycles = MAX_SETTLE_CYCLES, "host still busy, deferring");
        changed
    }

    /// Unmount the control.
    pub fn shutdown(&mut self) {
        self.control.destroy(&mut self.host);
    }

    fn report(&mut self, call: &str, error: ControlError) {
        tracing::error!(%error, call, "control call failed");
        self.fault = Some(error.to_string());
        self.fault_count += 1;
    }
}
