//! Reducer - (state, action, env) -> effects
//!
//! All tester state changes happen here. Host callbacks, timers and mode
//! writes come back as [`Effect`]s. `changed` on the result means the view
//! has to be redrawn: a row was logged with a forced refresh, the log was
//! reset, or a view update ran.

use chrono::{DateTime, Utc};
use pcf_tester::action::Action as _;
use pcf_tester::{ControlError, ControlState, DispatchResult, HostCall, HostContext};

use crate::action::Action;
use crate::command::Command;
use crate::effect::Effect;
use crate::probe::{parse_mode, Probe, PLATFORM_PARAMETERS};
use crate::state::TesterState;

/// Message of the fault raised by the `error` probe.
pub const INJECTED_FAULT: &str = "Error from updateView";

/// Read-only input to one dispatch
#[derive(Debug, Clone)]
pub struct Env {
    /// Host snapshot at the time of the call
    pub host: HostContext,
    /// Mode as currently stored
    pub mode: String,
    pub now: DateTime<Utc>,
    /// Random 1..=100 for `Event Value` outputs
    pub roll: u32,
}

impl Env {
    pub fn new(host: HostContext, mode: impl Into<String>, now: DateTime<Utc>, roll: u32) -> Self {
        Self {
            host,
            mode: mode.into(),
            now,
            roll,
        }
    }
}

type Outcome = Result<DispatchResult<Effect>, ControlError>;

pub fn reducer(state: &mut TesterState, action: Action, env: &Env) -> Outcome {
    let kind = action.name();
    match action {
        Action::Init { control_state } => {
            state.control_state = control_state;
            state.mode = env.mode.clone();
            let mut result =
                DispatchResult::effect(Effect::Host(HostCall::TrackContainerResize(true)));
            state.set_event(kind);
            state.log_event(env.now, "init", "---");
            result.merge(run_mode(state, env)?);
            Ok(result)
        }

        Action::UpdateView => {
            state.set_event(kind);
            state.mode = env.mode.clone();
            let mut result = run_mode(state, env)?;
            if state.schedule_event {
                state.schedule_event = false;
                result.push(Effect::Host(HostCall::OnAction));
            }
            Ok(result.mark_changed())
        }

        Action::GetOutputs => {
            state.set_event(kind);
            let outputs =
                serde_json::to_string(&state.property_bag).unwrap_or_else(|_| "{}".into());
            state.log_event(env.now, "---", outputs);
            Ok(DispatchResult::changed())
        }

        Action::Destroy => Ok(DispatchResult::unchanged()),

        Action::Command(command) => {
            state.set_event(kind);
            on_command(state, command, env)
        }

        Action::NotifyFired(i) => {
            state
                .property_bag
                .insert("output_1".into(), format!("notify {i}"));
            Ok(DispatchResult::effect(Effect::Host(
                HostCall::NotifyOutputChanged,
            )))
        }
    }
}

fn event_value(env: &Env) -> String {
    format!("Event Value {}", env.roll)
}

fn on_command(state: &mut TesterState, command: Command, env: &Env) -> Outcome {
    let host_call = |call: HostCall| -> Outcome { Ok(DispatchResult::effect(Effect::Host(call))) };

    match command {
        Command::Event => {
            state.property_bag.insert("output_2".into(), event_value(env));
            host_call(HostCall::OnAction)
        }
        Command::EventNotify => {
            state.property_bag.insert("output_2".into(), event_value(env));
            Ok(DispatchResult::effect(Effect::Host(HostCall::OnAction))
                .with(Effect::Host(HostCall::NotifyOutputChanged)))
        }
        Command::EventSchedule => {
            state.property_bag.insert("output_2".into(), event_value(env));
            state.schedule_event = true;
            host_call(HostCall::NotifyOutputChanged)
        }
        Command::SetSelection => {
            let first = env
                .host
                .dataset
                .as_ref()
                .and_then(|ds| ds.sorted_record_ids().next().map(str::to_string));
            match first {
                Some(id) => host_call(HostCall::SetSelectedRecordIds(vec![id])),
                None => {
                    tracing::warn!("setselection: no records to select");
                    Ok(DispatchResult::unchanged())
                }
            }
        }
        Command::ClearProperty { key } => {
            if let Some(key) = key {
                state.property_bag.remove(&key);
            }
            Ok(DispatchResult::unchanged())
        }
        Command::Set { key, value } => {
            if let Some(key) = key {
                state.property_bag.insert(key, value);
            }
            Ok(DispatchResult::unchanged())
        }
        Command::SetState { key, value } => {
            let control_state = state.control_state.get_or_insert_with(ControlState::new);
            if let Some(key) = key {
                control_state.insert(key, value);
            }
            host_call(HostCall::SetControlState(control_state.clone()))
        }
        Command::ClearState => {
            state.control_state = Some(ControlState::new());
            host_call(HostCall::SetControlState(ControlState::new()))
        }
        Command::PageSize(size) => host_call(HostCall::SetPageSize(size)),
        Command::Report => Ok(run_mode(state, env)?.mark_changed()),
        Command::Mode(mode) => {
            state.mode = mode.clone();
            Ok(DispatchResult::changed_with(Effect::PersistMode(mode))
                .with(Effect::Host(HostCall::NotifyOutputChanged)))
        }
        Command::Notify { count, interval } => {
            let mut result = DispatchResult::unchanged();
            for i in 0..count {
                result.push(Effect::Schedule {
                    delay: interval.saturating_mul(i),
                    action: Action::NotifyFired(i),
                });
            }
            Ok(result)
        }
        Command::Clear => {
            state.log.clear();
            state.counts.clear();
            Ok(DispatchResult::changed())
        }
        Command::Add(n) => {
            for i in 1..=n {
                state.log_event(env.now, "add", format!("Test message {i}"));
            }
            Ok(DispatchResult::changed())
        }
        Command::Refresh => host_call(HostCall::RefreshDataset),
        Command::LoadNextPage => host_call(HostCall::LoadNextPage),
        Command::LoadPreviousPage => host_call(HostCall::LoadPreviousPage),
        Command::LoadExactPage(page) => host_call(HostCall::LoadExactPage(page)),
        Command::Unknown(verb) => {
            tracing::warn!(%verb, "Unknown command");
            state.log_event(env.now, "⚠️unknown", format!("unknown command '{verb}'"));
            Ok(DispatchResult::changed())
        }
    }
}

/// Run every probe named by the current mode, in order.
fn run_mode(state: &mut TesterState, env: &Env) -> Outcome {
    let mut result = DispatchResult::unchanged();
    for probe in parse_mode(&env.mode) {
        result.merge(run_probe(state, &probe, env)?);
    }
    Ok(result)
}

/// Run one probe against the host snapshot.
pub fn run_probe(state: &mut TesterState, probe: &Probe, env: &Env) -> Outcome {
    let ctx = &env.host;
    let now = env.now;

    match probe {
        Probe::ClearEvents => {
            state.log.clear();
            Ok(DispatchResult::unchanged())
        }

        Probe::Error => {
            // The first view update always renders
            if state.count("updateView") > 1 {
                return Err(ControlError::Injected(INJECTED_FAULT.into()));
            }
            Ok(DispatchResult::unchanged())
        }

        Probe::Data => {
            let Some(ds) = &ctx.dataset else {
                return Ok(DispatchResult::unchanged());
            };
            let changed = ctx.was_updated("dataset") || ctx.was_updated("records_dataset_a");
            if ds.loading || !changed {
                return Ok(DispatchResult::unchanged());
            }
            let columns: Vec<_> = ds.visible_columns().collect();
            let total = ds.records.len();
            // Last record first so `Row 1` ends up on top
            for (i, record) in ds.records.iter().rev().enumerate() {
                let values: Vec<&str> = columns
                    .iter()
                    .map(|c| record.formatted_value(&c.name))
                    .collect();
                state.log_event(now, format!("Row {}", total - i), values.join(" | "));
            }
            Ok(DispatchResult::unchanged())
        }

        Probe::Columns | Probe::HiddenColumns => {
            let Some(ds) = &ctx.dataset else {
                return Ok(DispatchResult::unchanged());
            };
            let (source, columns): (&str, Vec<_>) = if *probe == Probe::Columns {
                ("Cols", ds.visible_columns().collect())
            } else {
                ("Hidden Cols", ds.hidden_columns().collect())
            };
            let display: Vec<&str> = columns.iter().map(|c| c.display_name.as_str()).collect();
            let logical: Vec<String> = columns.iter().map(|c| c.logical_name()).collect();
            state.log_event(now, source, display.join(" | "));
            state.log_event(now, "Cols (logical/alias)", logical.join(" | "));
            Ok(DispatchResult::changed())
        }

        Probe::DataSet => {
            let Some(ds) = &ctx.dataset else {
                return Ok(DispatchResult::unchanged());
            };
            let source = format!("📁dataset {}", state.counts.increment("dataset"));
            let message = if ds.loading {
                "⌛".to_string()
            } else if ds.error {
                format!("⚠️{}", ds.error_message)
            } else {
                let p = &ds.paging;
                format!(
                    "{}/{}  | firstPage:{} | lastPage:{} | {}  {}",
                    ds.records.len(),
                    p.total_result_count,
                    p.first_page_number,
                    p.last_page_number,
                    if p.has_previous_page { "⬅️" } else { "" },
                    if p.has_next_page { "➡️" } else { "" },
                )
            };
            state.log_event(now, source, message);
            Ok(DispatchResult::unchanged())
        }

        Probe::Size => {
            let source = format!("📦Size {}", state.counts.increment("size"));
            let message = format!(
                "width={} height={}",
                ctx.viewport.allocated_width, ctx.viewport.allocated_height
            );
            state.log_event(now, source, message);
            Ok(DispatchResult::unchanged())
        }

        Probe::Updates => {
            let source = format!("🧿updates {}", state.counts.increment("updates"));
            state.log_event(now, source, ctx.updated_properties.join(" | "));
            Ok(DispatchResult::unchanged())
        }

        Probe::Inputs => {
            let source = format!("♻️inputs {}", state.counts.increment("inputs"));
            let fields: Vec<String> = ctx
                .parameters
                .iter()
                .filter(|(name, _)| !PLATFORM_PARAMETERS.contains(&name.as_str()))
                .map(|(name, raw)| format!("{}={}", name, raw.as_deref().unwrap_or("(none)")))
                .collect();
            state.log_event(now, source, fields.join(" | "));
            Ok(DispatchResult::unchanged())
        }

        Probe::State => {
            if let Some(control_state) = &state.control_state {
                let json = serde_json::to_string(control_state).unwrap_or_else(|_| "{}".into());
                state.log_event(now, "state", json);
            }
            Ok(DispatchResult::unchanged())
        }

        Probe::Bound => {
            let bound: Vec<String> = ctx
                .parameters
                .iter()
                .filter(|(name, _)| name.starts_with("bound_"))
                .map(|(name, raw)| format!("{}={}", name, raw.as_deref().unwrap_or("(none)")))
                .collect();
            state.log_event(now, "bound", bound.join(" "));
            Ok(DispatchResult::unchanged())
        }

        Probe::Other(_) => {
            state.log_event(now, "---", "---");
            Ok(DispatchResult::unchanged())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcf_tester::{assert_emitted, assert_not_emitted, Column, DataSet, Paging, Record};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn env(mode: &str) -> Env {
        Env::new(HostContext::default(), mode, Utc::now(), 42)
    }

    fn env_with(host: HostContext, mode: &str) -> Env {
        Env::new(host, mode, Utc::now(), 42)
    }

    fn sources(state: &TesterState) -> Vec<&str> {
        state.log.rows().map(|r| r.source.as_str()).collect()
    }

    fn column(name: &str, display: &str, hidden: bool) -> Column {
        Column {
            name: name.into(),
            display_name: display.into(),
            alias: None,
            is_hidden: hidden,
            order: if hidden { -1 } else { 0 },
        }
    }

    fn record(id: &str, name: &str, city: &str) -> Record {
        Record {
            id: id.into(),
            values: [("name".to_string(), name.to_string()), ("city".to_string(), city.to_string())]
                .into_iter()
                .collect(),
        }
    }

    fn dataset() -> DataSet {
        DataSet {
            columns: vec![
                column("name", "Name", false),
                column("city", "City", false),
                column("secret", "Secret", true),
            ],
            records: vec![record("a", "Alpha", "Oslo"), record("b", "Beta", "Rome")],
            paging: Paging {
                total_result_count: 12,
                first_page_number: 1,
                last_page_number: 1,
                has_previous_page: false,
                has_next_page: true,
                page_size: 2,
            },
            ..Default::default()
        }
    }

    fn command(state: &mut TesterState, cmd: Command, env: &Env) -> Outcome {
        reducer(state, Action::Command(cmd), env)
    }

    #[test]
    fn test_init_logs_and_tracks_resize() {
        let mut state = TesterState::default();
        let result = reducer(&mut state, Action::Init { control_state: None }, &env("default")).unwrap();

        assert_eq!(
            result.effects[0],
            Effect::Host(HostCall::TrackContainerResize(true))
        );
        // placeholder row from the `default` probe on top of the init row
        assert_eq!(sources(&state), vec!["---", "init"]);
        assert_eq!(state.log.newest().unwrap().event_name, "🟢 1");
    }

    #[test]
    fn test_update_view_always_redraws() {
        let mut state = TesterState::default();
        let result = reducer(&mut state, Action::UpdateView, &env("clearevents")).unwrap();
        assert!(result.changed);
        assert!(state.log.is_empty());
    }

    #[test]
    fn test_error_probe_spares_first_update() {
        let mut state = TesterState::default();
        let e = env("error");
        assert!(reducer(&mut state, Action::UpdateView, &e).is_ok());
        for _ in 0..3 {
            assert_eq!(
                reducer(&mut state, Action::UpdateView, &e).unwrap_err(),
                ControlError::Injected(INJECTED_FAULT.into())
            );
        }
    }

    #[test]
    fn test_error_probe_in_report_after_updates() {
        let mut state = TesterState::default();
        reducer(&mut state, Action::UpdateView, &env("default")).unwrap();
        reducer(&mut state, Action::UpdateView, &env("default")).unwrap();
        assert!(command(&mut state, Command::Report, &env("error")).is_err());
    }

    #[test]
    fn test_mode_probes_run_in_order() {
        let mut state = TesterState::default();
        let mut host = HostContext::default();
        host.viewport.allocated_width = 300;
        host.viewport.allocated_height = 200;
        host.updated_properties = vec!["layout".into(), "bound_1".into()];

        reducer(&mut state, Action::UpdateView, &env_with(host, "size,updates")).unwrap();

        let rows: Vec<_> = state.log.rows().map(|r| (r.source.clone(), r.message.clone())).collect();
        assert_eq!(
            rows,
            vec![
                ("🧿updates 1".to_string(), "layout | bound_1".to_string()),
                ("📦Size 1".to_string(), "width=300 height=200".to_string()),
            ]
        );
    }

    #[test]
    fn test_get_outputs_logs_bag() {
        let mut state = TesterState::default();
        command(
            &mut state,
            Command::Set {
                key: Some("output_1".into()),
                value: "x".into(),
            },
            &env("default"),
        )
        .unwrap();
        let result = reducer(&mut state, Action::GetOutputs, &env("default")).unwrap();
        assert!(result.changed);
        let row = state.log.newest().unwrap();
        assert_eq!(row.source, "---");
        assert_eq!(row.message, r#"{"output_1":"x"}"#);
        assert_eq!(row.event_name, "🔼 1");
    }

    #[test]
    fn test_event_commands() {
        let mut state = TesterState::default();
        let e = env("default");

        let result = command(&mut state, Command::Event, &e).unwrap();
        assert_eq!(state.property_bag["output_2"], "Event Value 42");
        assert_eq!(result.effects, vec![Effect::Host(HostCall::OnAction)]);

        let result = command(&mut state, Command::EventNotify, &e).unwrap();
        assert_eq!(
            result.effects,
            vec![
                Effect::Host(HostCall::OnAction),
                Effect::Host(HostCall::NotifyOutputChanged)
            ]
        );

        let result = command(&mut state, Command::EventSchedule, &e).unwrap();
        assert!(state.schedule_event);
        assert_not_emitted!(result.effects, Effect::Host(HostCall::OnAction));

        let result = reducer(&mut state, Action::UpdateView, &e).unwrap();
        assert_emitted!(result.effects, Effect::Host(HostCall::OnAction));
        assert!(!state.schedule_event);
    }

    #[test]
    fn test_set_state_and_clear_state() {
        let mut state = TesterState::default();
        let e = env("state");
        let result = command(
            &mut state,
            Command::SetState {
                key: Some("k".into()),
                value: "v".into(),
            },
            &e,
        )
        .unwrap();
        let expected: ControlState = [("k".to_string(), "v".to_string())].into_iter().collect();
        assert_eq!(
            result.effects,
            vec![Effect::Host(HostCall::SetControlState(expected))]
        );

        command(&mut state, Command::Report, &e).unwrap();
        assert_eq!(state.log.newest().unwrap().message, r#"{"k":"v"}"#);

        let result = command(&mut state, Command::ClearState, &e).unwrap();
        assert_emitted!(result.effects, Effect::Host(HostCall::SetControlState(s)) if s.is_empty());
        assert_eq!(state.control_state, Some(ControlState::new()));
    }

    #[test]
    fn test_notify_schedules_spaced_timers() {
        let mut state = TesterState::default();
        let result = command(
            &mut state,
            Command::Notify {
                count: 3,
                interval: Duration::from_millis(100),
            },
            &env("default"),
        )
        .unwrap();
        let delays: Vec<_> = result
            .effects
            .iter()
            .map(|e| match e {
                Effect::Schedule { delay, action } => (delay.as_millis(), action.clone()),
                other => panic!("unexpected effect {other:?}"),
            })
            .collect();
        assert_eq!(
            delays,
            vec![
                (0, Action::NotifyFired(0)),
                (100, Action::NotifyFired(1)),
                (200, Action::NotifyFired(2)),
            ]
        );
    }

    #[test]
    fn test_notify_fired_sets_output() {
        let mut state = TesterState::default();
        let result = reducer(&mut state, Action::NotifyFired(2), &env("default")).unwrap();
        assert_eq!(state.property_bag["output_1"], "notify 2");
        assert_eq!(result.effects, vec![Effect::Host(HostCall::NotifyOutputChanged)]);
        assert!(state.log.is_empty());
    }

    #[test]
    fn test_mode_command_persists_and_notifies() {
        let mut state = TesterState::default();
        let result = command(&mut state, Command::Mode("size".into()), &env("default")).unwrap();
        assert_eq!(state.mode, "size");
        assert_eq!(
            result.effects,
            vec![
                Effect::PersistMode("size".into()),
                Effect::Host(HostCall::NotifyOutputChanged)
            ]
        );
    }

    #[test]
    fn test_clear_resets_log_and_counts() {
        let mut state = TesterState::default();
        let e = env("size");
        reducer(&mut state, Action::UpdateView, &e).unwrap();
        command(&mut state, Command::Add(3), &e).unwrap();
        let result = command(&mut state, Command::Clear, &e).unwrap();
        assert!(result.changed);
        assert!(state.log.is_empty());
        assert!(state.counts.is_empty());
    }

    #[test]
    fn test_dataset_commands_map_to_host_calls() {
        let mut state = TesterState::default();
        let e = env("default");
        let cases = [
            (Command::PageSize(10), HostCall::SetPageSize(10)),
            (Command::Refresh, HostCall::RefreshDataset),
            (Command::LoadNextPage, HostCall::LoadNextPage),
            (Command::LoadPreviousPage, HostCall::LoadPreviousPage),
            (Command::LoadExactPage(4), HostCall::LoadExactPage(4)),
        ];
        for (cmd, call) in cases {
            let result = command(&mut state, cmd, &e).unwrap();
            assert_eq!(result.effects, vec![Effect::Host(call)]);
        }
    }

    #[test]
    fn test_setselection_picks_first_record() {
        let mut state = TesterState::default();
        let host = HostContext {
            dataset: Some(dataset()),
            ..Default::default()
        };
        let result = command(&mut state, Command::SetSelection, &env_with(host, "default")).unwrap();
        assert_eq!(
            result.effects,
            vec![Effect::Host(HostCall::SetSelectedRecordIds(vec!["a".into()]))]
        );

        let result = command(&mut state, Command::SetSelection, &env("default")).unwrap();
        assert!(result.effects.is_empty());
    }

    #[test]
    fn test_data_probe_only_on_dataset_change() {
        let mut state = TesterState::default();
        let mut host = HostContext {
            dataset: Some(dataset()),
            ..Default::default()
        };
        run_probe(&mut state, &Probe::Data, &env_with(host.clone(), "data")).unwrap();
        assert!(state.log.is_empty());

        host.updated_properties.push("records_dataset_a".into());
        run_probe(&mut state, &Probe::Data, &env_with(host, "data")).unwrap();
        let rows: Vec<_> = state.log.rows().map(|r| (r.source.clone(), r.message.clone())).collect();
        assert_eq!(
            rows,
            vec![
                ("Row 1".to_string(), "Alpha | Oslo".to_string()),
                ("Row 2".to_string(), "Beta | Rome".to_string()),
            ]
        );
    }

    #[test]
    fn test_columns_probes() {
        let mut state = TesterState::default();
        let mut ds = dataset();
        ds.columns[1].alias = Some("addr.city".into());
        let host = HostContext {
            dataset: Some(ds),
            ..Default::default()
        };
        let e = env_with(host, "columns");

        let result = run_probe(&mut state, &Probe::Columns, &e).unwrap();
        assert!(result.changed);
        let rows: Vec<_> = state.log.rows().map(|r| (r.source.clone(), r.message.clone())).collect();
        assert_eq!(
            rows,
            vec![
                ("Cols (logical/alias)".to_string(), "name | city(addr.city)".to_string()),
                ("Cols".to_string(), "Name | City".to_string()),
            ]
        );

        run_probe(&mut state, &Probe::HiddenColumns, &e).unwrap();
        assert_eq!(state.log.rows().nth(1).unwrap().source, "Hidden Cols");
        assert_eq!(state.log.rows().nth(1).unwrap().message, "Secret");
    }

    #[test]
    fn test_dataset_probe_messages() {
        let mut state = TesterState::default();
        let mut ds = dataset();
        let host = |ds: &DataSet| HostContext {
            dataset: Some(ds.clone()),
            ..Default::default()
        };

        run_probe(&mut state, &Probe::DataSet, &env_with(host(&ds), "dataset")).unwrap();
        let row = state.log.newest().unwrap();
        assert_eq!(row.source, "📁dataset 1");
        assert_eq!(row.message, "2/12  | firstPage:1 | lastPage:1 |   ➡️");

        ds.loading = true;
        run_probe(&mut state, &Probe::DataSet, &env_with(host(&ds), "dataset")).unwrap();
        assert_eq!(state.log.newest().unwrap().message, "⌛");

        ds.loading = false;
        ds.error = true;
        ds.error_message = "boom".into();
        run_probe(&mut state, &Probe::DataSet, &env_with(host(&ds), "dataset")).unwrap();
        assert_eq!(state.log.newest().unwrap().message, "⚠️boom");
        assert_eq!(state.log.newest().unwrap().source, "📁dataset 3");
    }

    #[test]
    fn test_inputs_skip_platform_parameters() {
        let mut state = TesterState::default();
        let mut host = HostContext::default();
        host.parameters.insert("scope".into(), Some("x".into()));
        host.parameters.insert("bound_1".into(), Some("one".into()));
        host.parameters.insert("formHeight".into(), None);

        run_probe(&mut state, &Probe::Inputs, &env_with(host, "inputs")).unwrap();
        let row = state.log.newest().unwrap();
        assert_eq!(row.source, "♻️inputs 1");
        assert_eq!(row.message, "bound_1=one | formHeight=(none)");
    }

    #[test]
    fn test_bound_probe() {
        let mut state = TesterState::default();
        let mut host = HostContext::default();
        host.parameters.insert("bound_1".into(), Some("a".into()));
        host.parameters.insert("bound_2".into(), Some("b".into()));
        host.parameters.insert("output_1".into(), Some("c".into()));

        run_probe(&mut state, &Probe::Bound, &env_with(host, "bound")).unwrap();
        assert_eq!(state.log.newest().unwrap().message, "bound_1=a bound_2=b");
    }

    #[test]
    fn test_unknown_command_logs_warning_row() {
        let mut state = TesterState::default();
        let result = command(&mut state, Command::Unknown("frobnicate".into()), &env("default")).unwrap();
        assert!(result.changed);
        assert!(result.effects.is_empty());
        assert_eq!(state.log.newest().unwrap().message, "unknown command 'frobnicate'");
    }
}
