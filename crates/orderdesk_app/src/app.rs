use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use desk_logging::{desk_debug, desk_info, desk_warn};
use orderdesk_bridge::{ChannelHostLink, HostLink};
use orderdesk_core::{update, AppState, Msg, SearchDebouncer};

use crate::config::DeskConfig;
use crate::console::{self, ConsoleInput};
use crate::effects::EffectRunner;

/// Upper bound on how long the loop sleeps without checking host replies.
const TICK: Duration = Duration::from_millis(75);
/// How long to wait for a posted host line to come back decoded.
const DECODE_WAIT: Duration = Duration::from_secs(1);
/// How long to wait for trailing host replies once stdin closes.
const DRAIN_GRACE: Duration = Duration::from_millis(200);

pub fn run(config: DeskConfig) -> anyhow::Result<()> {
    let (link, host) = ChannelHostLink::pair();
    let (host_tx, outbound_rx) = host.split();

    // Outbound host messages are the only thing written to stdout.
    thread::spawn(move || {
        let stdout = io::stdout();
        while let Ok(text) = outbound_rx.recv() {
            let mut out = stdout.lock();
            if writeln!(out, "{text}").and_then(|_| out.flush()).is_err() {
                break;
            }
        }
    });

    let (input_tx, input_rx) = mpsc::channel::<ConsoleInput>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match console::parse_line(&line) {
                Ok(Some(input)) => {
                    if input_tx.send(input).is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(err) => eprintln!("{err}"),
            }
        }
    });

    let mut session = Session::new(&config, link);
    session.dispatch(Msg::Started);

    loop {
        let now = Instant::now();
        let timeout = session
            .debouncer
            .time_until_due(now)
            .map_or(TICK, |due| due.min(TICK));
        match input_rx.recv_timeout(timeout) {
            Ok(ConsoleInput::Quit) => break,
            Ok(ConsoleInput::SearchTyped(text)) => session.debouncer.input(text, Instant::now()),
            Ok(ConsoleInput::Ui(msg)) => session.dispatch(msg),
            Ok(ConsoleInput::Host(text)) => {
                if host_tx.send(text).is_err() {
                    desk_warn!("host link closed");
                    break;
                }
                // One decoded result per posted line keeps stdin order intact.
                session.await_host(DECODE_WAIT);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                desk_debug!("stdin closed; draining host replies");
                session.drain(DRAIN_GRACE);
                break;
            }
        }
        if let Some(text) = session.debouncer.poll(Instant::now()) {
            session.dispatch(Msg::SearchSettled(text));
        }
        session.pump_host();
    }

    desk_info!("orderdesk session ended");
    Ok(())
}

struct Session {
    state: AppState,
    debouncer: SearchDebouncer,
    runner: EffectRunner<ChannelHostLink>,
}

impl Session {
    fn new(config: &DeskConfig, link: ChannelHostLink) -> Self {
        Self {
            state: AppState::new(config.desk_settings()),
            debouncer: SearchDebouncer::new(config.debounce()),
            runner: EffectRunner::new(link),
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.runner.run(effects);
        if state.consume_dirty() {
            eprint!("{}", console::render(&state.view()));
        }
        self.state = state;
    }

    /// Applies every host message that has already been decoded.
    fn pump_host(&mut self) {
        while let Some(received) = self.runner.link().try_recv() {
            self.apply_received(received);
        }
    }

    fn await_host(&mut self, wait: Duration) {
        if let Some(received) = self.runner.link().recv_timeout(wait) {
            self.apply_received(received);
        }
    }

    fn drain(&mut self, grace: Duration) {
        while let Some(received) = self.runner.link().recv_timeout(grace) {
            self.apply_received(received);
        }
    }

    fn apply_received(
        &mut self,
        received: Result<orderdesk_core::InboundMessage, orderdesk_bridge::DecodeError>,
    ) {
        match received {
            Ok(message) => {
                desk_debug!("<- {} ticket={:?}", message.kind(), message.ticket());
                self.dispatch(Msg::Host(message));
            }
            // Rejected payloads are logged by the link.
            Err(err) => desk_debug!("dropped host message: {}", err),
        }
    }
}
