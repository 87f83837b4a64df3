//! Property bag retrieval and scheduled notifications

use std::time::Duration;

use pcf_tester::testing::RecordingHost;
use pcf_tester::{HostCall, ManualClock, MemoryModeStore};
use pcf_tester_app::control::Control;
use pretty_assertions::assert_eq;

fn control() -> (Control<MemoryModeStore, ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let control = Control::seeded(MemoryModeStore::new(), clock.clone(), 11);
    (control, clock)
}

#[test]
fn test_set_then_retrieve() {
    let (mut control, _) = control();
    let mut host = RecordingHost::default();

    control.on_command("set output_3 blue", &mut host).unwrap();
    control.on_command("set bound_1", &mut host).unwrap();
    let outputs = control.get_outputs(&mut host).unwrap();
    assert_eq!(outputs["output_3"], "blue");
    assert_eq!(outputs["bound_1"], "");

    control.on_command("clearproperty output_3", &mut host).unwrap();
    let outputs = control.get_outputs(&mut host).unwrap();
    assert!(!outputs.contains_key("output_3"));
    assert!(outputs.contains_key("bound_1"));
}

#[test]
fn test_retrieval_is_logged() {
    let (mut control, _) = control();
    let mut host = RecordingHost::default();
    control.on_command("set a 1", &mut host).unwrap();
    control.get_outputs(&mut host).unwrap();

    let row = control.state().log.newest().unwrap();
    assert_eq!(row.event_name, "🔼 1");
    assert_eq!(row.message, r#"{"a":"1"}"#);
}

#[test]
fn test_notify_spacing() {
    let (mut control, clock) = control();
    let mut host = RecordingHost::default();
    control.on_command("notify 4 250", &mut host).unwrap();

    let mut fired_at = Vec::new();
    for step in 0..=8u64 {
        let before = host.count(&HostCall::NotifyOutputChanged);
        control.fire_due(&mut host).unwrap();
        let after = host.count(&HostCall::NotifyOutputChanged);
        for _ in before..after {
            fired_at.push(step * 125);
        }
        clock.advance(Duration::from_millis(125));
    }

    assert_eq!(fired_at, vec![0, 250, 500, 750]);
    assert_eq!(control.state().property_bag["output_1"], "notify 3");
}

#[test]
fn test_notify_defaults_to_one_immediate() {
    let (mut control, _) = control();
    let mut host = RecordingHost::default();
    control.on_command("notify_n", &mut host).unwrap();
    assert_eq!(control.next_timer_in(), Some(Duration::ZERO));

    control.fire_due(&mut host).unwrap();
    assert_eq!(host.drain_calls(), vec![HostCall::NotifyOutputChanged]);
    assert_eq!(control.pending_timers(), 0);
}

#[test]
fn test_notify_zero_interval_fires_together() {
    let (mut control, _) = control();
    let mut host = RecordingHost::default();
    control.on_command("notify 3", &mut host).unwrap();
    control.fire_due(&mut host).unwrap();
    assert_eq!(host.count(&HostCall::NotifyOutputChanged), 3);
    // fired in scheduling order, last writer wins
    assert_eq!(control.state().property_bag["output_1"], "notify 2");
}

#[test]
fn test_event_family_host_calls() {
    let (mut control, _) = control();
    let mut host = RecordingHost::default();

    control.on_command("event", &mut host).unwrap();
    assert_eq!(host.drain_calls(), vec![HostCall::OnAction]);

    control.on_command("eventnotify", &mut host).unwrap();
    assert_eq!(
        host.drain_calls(),
        vec![HostCall::OnAction, HostCall::NotifyOutputChanged]
    );

    control.on_command("eventschedule", &mut host).unwrap();
    assert_eq!(host.drain_calls(), vec![HostCall::NotifyOutputChanged]);
    control.update_view(&mut host).unwrap();
    assert_eq!(host.drain_calls(), vec![HostCall::OnAction]);
    control.update_view(&mut host).unwrap();
    assert!(host.drain_calls().is_empty());
}
