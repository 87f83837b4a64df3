//! Run loops
//!
//! Both loops `select!` over user input and the control's next timer
//! deadline. The session settles the host after every input, so a loop only
//! has to decide when to redraw.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use pcf_tester::poller::{spawn_event_poller, PollerConfig, RawEvent};
use pcf_tester::{Clock, Component, EventKind, Host, ModeStore};
use ratatui::{backend::Backend, Terminal};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::session::Session;
use crate::view::{HeightMode, PlainView, TesterView, TesterViewProps, UiMsg};

fn view_props<'a, M: ModeStore, K: Clock>(
    session: &'a Session<M, K>,
    line: &'a str,
) -> TesterViewProps<'a> {
    TesterViewProps {
        state: session.control().state(),
        line,
        height: HeightMode::from_host(session.host().context()),
        fault: session.fault(),
        actions: session.host().action_count(),
    }
}

/// Sleep for `wait`, or forever when no timer is pending.
async fn next_timer(wait: Option<Duration>) {
    match wait {
        Some(wait) => tokio::time::sleep(wait).await,
        None => std::future::pending().await,
    }
}

/// Full-screen loop. Returns on Ctrl+C / Ctrl+Q.
pub async fn run_tui<B, M, K>(
    terminal: &mut Terminal<B>,
    session: &mut Session<M, K>,
) -> io::Result<()>
where
    B: Backend,
    M: ModeStore,
    K: Clock,
{
    let size = terminal.size()?;
    session
        .host_mut()
        .resize(i32::from(size.width), i32::from(size.height));
    session.start(None);

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<RawEvent>();
    let cancel_token = CancellationToken::new();
    let _poller = spawn_event_poller(event_tx, PollerConfig::default(), cancel_token.clone());

    let mut view = TesterView::new();
    let mut line = String::new();
    let mut should_render = true;

    loop {
        if should_render {
            terminal.draw(|frame| {
                view.render(frame, frame.area(), view_props(session, &line));
            })?;
            should_render = false;
        }

        let wait = session.next_timer_in();
        tokio::select! {
            Some(raw) = event_rx.recv() => {
                let event = EventKind::from(raw);
                if event.is_quit() {
                    break;
                }
                if let EventKind::Resize(width, height) = event {
                    session.resize(width, height);
                    should_render = true;
                    continue;
                }

                let msgs: Vec<UiMsg> = view
                    .handle_event(&event, view_props(session, &line))
                    .into_iter()
                    .collect();
                for msg in msgs {
                    match msg {
                        UiMsg::LineChanged(next) => line = next,
                        UiMsg::Submit(command) => {
                            tracing::debug!(%command, "submit");
                            session.command(&command);
                        }
                    }
                }
                // cursor moves and scrolling emit nothing but still redraw
                should_render = true;
            }

            _ = next_timer(wait) => {
                should_render |= session.tick();
            }

            else => break,
        }
    }

    cancel_token.cancel();
    session.shutdown();
    Ok(())
}

/// Read stdin lines on a plain thread and forward them. The channel closes
/// at end of input.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(error) => {
                    tracing::warn!(%error, "stdin read failed");
                    break;
                }
            }
        }
    });
    rx
}

/// Line-oriented loop: each received line is one command. Returns when the
/// line source closes.
pub async fn run_plain<W, M, K>(
    session: &mut Session<M, K>,
    mut lines: mpsc::UnboundedReceiver<String>,
    out: W,
) -> io::Result<()>
where
    W: Write,
    M: ModeStore,
    K: Clock,
{
    let mut view = PlainView::new(out);
    session.start(None);
    view.refresh(session.control().state(), session.fault())?;

    loop {
        let wait = session.next_timer_in();
        let changed = tokio::select! {
            line = lines.recv() => match line {
                Some(line) => session.command(&line),
                None => break,
            },
            _ = next_timer(wait) => session.tick(),
        };
        if changed {
            view.refresh(session.control().state(), session.fault())?;
        }
    }

    session.shutdown();
    Ok(())
}
