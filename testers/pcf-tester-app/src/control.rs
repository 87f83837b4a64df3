//! The tester control as a host sees it
//!
//! [`Control`] owns the store and everything the reducer is not allowed to
//! touch: the mode store, the timer queue, the clock and the random source.
//! Each lifecycle call builds an [`Env`], dispatches, then carries out the
//! returned effects against the host in emission order.

use std::time::Duration;

use pcf_tester::{
    Clock, ControlError, ControlState, EffectStoreWithMiddleware, Host, LoggingMiddleware,
    ModeStore, TimerQueue,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::action::Action;
use crate::command::Command;
use crate::effect::Effect;
use crate::reducer::{reducer, Env};
use crate::state::{PropertyBag, TesterState};

type TesterStore = EffectStoreWithMiddleware<TesterState, Action, Effect, Env, LoggingMiddleware>;

/// A tester control instance.
pub struct Control<M, K> {
    store: TesterStore,
    modes: M,
    clock: K,
    timers: TimerQueue<Action>,
    rng: StdRng,
}

impl<M: ModeStore, K: Clock> Control<M, K> {
    pub fn new(modes: M, clock: K) -> Self {
        Self::with_rng(modes, clock, StdRng::from_entropy())
    }

    /// Control whose `Event Value` rolls are repeatable.
    pub fn seeded(modes: M, clock: K, seed: u64) -> Self {
        Self::with_rng(modes, clock, StdRng::seed_from_u64(seed))
    }

    fn with_rng(modes: M, clock: K, rng: StdRng) -> Self {
        Self {
            store: EffectStoreWithMiddleware::new(
                TesterState::default(),
                reducer,
                LoggingMiddleware::new(),
            ),
            modes,
            clock,
            timers: TimerQueue::new(),
            rng,
        }
    }

    pub fn state(&self) -> &TesterState {
        self.store.state()
    }

    pub fn mode(&self) -> String {
        self.modes.get_mode()
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    /// Timers not yet fired.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Time until the next timer is due, zero if one is overdue.
    pub fn next_timer_in(&self) -> Option<Duration> {
        self.timers.time_until_next(self.clock.elapsed())
    }

    /// Dispatch one action and apply its effects. Returns whether the view
    /// must be redrawn.
    pub fn dispatch<H: Host + ?Sized>(
        &mut self,
        action: Action,
        host: &mut H,
    ) -> Result<bool, ControlError> {
        let env = Env::new(
            host.context().clone(),
            self.modes.get_mode(),
            self.clock.wall(),
            self.rng.gen_range(1..=100),
        );
        let result = self.store.dispatch(action, &env)?;
        for effect in result.effects {
            self.apply(effect, host);
        }
        Ok(result.changed)
    }

    fn apply<H: Host + ?Sized>(&mut self, effect: Effect, host: &mut H) {
        match effect {
            Effect::Host(call) => call.apply(host),
            Effect::Schedule { delay, action } => {
                self.timers.schedule(self.clock.elapsed(), delay, action);
            }
            Effect::PersistMode(mode) => {
                if let Err(error) = self.modes.set_mode(&mode) {
                    tracing::error!(%error, %mode, "Failed to persist mode");
                }
            }
        }
    }

    pub fn init<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        control_state: Option<ControlState>,
    ) -> Result<bool, ControlError> {
        self.dispatch(Action::Init { control_state }, host)
    }

    pub fn update_view<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<bool, ControlError> {
        self.dispatch(Action::UpdateView, host)
    }

    /// The whole property bag, after logging the retrieval.
    pub fn get_outputs<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Result<PropertyBag, ControlError> {
        self.dispatch(Action::GetOutputs, host)?;
        Ok(self.state().property_bag.clone())
    }

    /// Parse and run one command line. Blank lines do nothing.
    pub fn on_command<H: Host + ?Sized>(
        &mut self,
        line: &str,
        host: &mut H,
    ) -> Result<bool, ControlError> {
        match Command::parse(line) {
            Some(command) => self.dispatch(Action::Command(command), host),
            None => Ok(false),
        }
    }

    /// Fire every timer due by now, earliest first.
    pub fn fire_due<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<bool, ControlError> {
        let mut changed = false;
        for action in self.timers.pop_due(self.clock.elapsed()) {
            changed |= self.dispatch(action, host)?;
        }
        Ok(changed)
    }

    /// Detach from the host. Pending timers belong to this instance and
    /// are dropped with it.
    pub fn destroy<H: Host + ?Sized>(&mut self, host: &mut H) {
        if let Err(error) = self.dispatch(Action::Destroy, host) {
            tracing::warn!(%error, "destroy failed");
        }
        self.timers.clear();
    }
}
