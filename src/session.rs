//! Session Controller: the run-state machine.
//!
//! The start and pause controls are toggles whose meaning depends on the
//! current [`RunState`], so the controller (not the UI) decides what a press
//! does:
//!
//! | event         | from               | to        |
//! |---------------|--------------------|-----------|
//! | start pressed | `Stopped`          | `Running` |
//! | start pressed | `Running`/`Paused` | `Stopped` |
//! | pause pressed | `Running`          | `Paused`  |
//! | pause pressed | `Paused`           | `Running` |
//!
//! Selecting a program never changes the state; while a session is active it
//! hot-swaps the program in the engine.

use tracing::{debug, info, warn};

use crate::boundary::{BoundaryAdapter, EngineCalls};
use crate::config::ConsoleConfig;
use crate::keypad::Keypad;
use crate::listing::InstructionListing;
use crate::monitor::TelemetryMonitor;
use crate::program::ProgramDescriptor;
use crate::scheduler::{FrameScheduler, PollHandle};
use crate::sink::PresentationSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Stopped,
    Running,
    Paused,
}

impl RunState {
    /// A session exists (running or paused).
    pub fn is_active(self) -> bool {
        self != RunState::Stopped
    }

    pub fn is_paused(self) -> bool {
        self == RunState::Paused
    }

    pub fn label(self) -> &'static str {
        match self {
            RunState::Stopped => "stopped",
            RunState::Running => "running",
            RunState::Paused => "paused",
        }
    }
}

pub struct SessionController<E, S, F> {
    adapter: BoundaryAdapter<E>,
    monitor: TelemetryMonitor<F>,
    keypad: Keypad,
    sink: S,
    run_state: RunState,
    active_program: Option<ProgramDescriptor>,
}

impl<E, S, F> SessionController<E, S, F>
where
    E: EngineCalls,
    S: PresentationSink,
    F: FrameScheduler,
{
    pub fn new(cfg: &ConsoleConfig, engine: E, sink: S, scheduler: F) -> Self {
        Self {
            adapter: BoundaryAdapter::new(engine, cfg.rom_dir.clone(), cfg.program_start),
            monitor: TelemetryMonitor::new(cfg, scheduler),
            keypad: Keypad::default(),
            sink,
            run_state: RunState::Stopped,
            active_program: None,
        }
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn active_program(&self) -> Option<&ProgramDescriptor> {
        self.active_program.as_ref()
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitor.is_monitoring()
    }

    pub fn monitor(&self) -> &TelemetryMonitor<F> {
        &self.monitor
    }

    pub fn monitor_mut(&mut self) -> &mut TelemetryMonitor<F> {
        &mut self.monitor
    }

    pub fn adapter(&self) -> &BoundaryAdapter<E> {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut BoundaryAdapter<E> {
        &mut self.adapter
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Forced refresh outside the polling loop (used at startup).
    pub fn refresh(&mut self) -> usize {
        self.monitor.update_all(&mut self.adapter, &mut self.sink)
    }

    /// Pushes the current control state to the sink.
    pub fn publish_controls(&mut self) {
        let is_running = self.run_state.is_active();
        self.sink.set_start_button_state(is_running);
        self.sink
            .set_pause_button_state(self.run_state.is_paused(), is_running);
    }

    /// Start/stop toggle.
    pub fn press_start(&mut self) -> RunState {
        match self.run_state {
            RunState::Stopped => {
                match &self.active_program {
                    Some(program) => {
                        info!(title = %program.title, "starting session");
                        push_program(&mut self.adapter, program, false);
                    }
                    None => warn!("starting session with no program selected"),
                }
                self.adapter.start();
                self.monitor.start_monitoring(&mut self.adapter, &mut self.sink);
                self.transition(RunState::Running);
            }
            RunState::Running | RunState::Paused => {
                info!("stopping session");
                self.adapter.stop();
                self.monitor.cancel_monitoring();
                self.monitor.update_all(&mut self.adapter, &mut self.sink);
                self.transition(RunState::Stopped);
            }
        }
        self.run_state
    }

    /// Pause/resume toggle. Ignored while stopped, where the control is
    /// disabled.
    pub fn press_pause(&mut self) -> RunState {
        match self.run_state {
            RunState::Running => {
                self.adapter.pause();
                self.monitor.cancel_monitoring();
                self.monitor.update_all(&mut self.adapter, &mut self.sink);
                self.transition(RunState::Paused);
            }
            RunState::Paused => {
                self.adapter.resume();
                self.monitor.start_monitoring(&mut self.adapter, &mut self.sink);
                self.transition(RunState::Running);
            }
            RunState::Stopped => debug!("pause pressed while stopped; ignored"),
        }
        self.run_state
    }

    /// Changes the selected program. While a session is active the new
    /// program is pushed to the engine immediately, without stopping.
    pub fn select_program(&mut self, program: Option<ProgramDescriptor>) {
        self.active_program = program;
        if !self.run_state.is_active() {
            return;
        }
        if let Some(program) = &self.active_program {
            info!(title = %program.title, "hot-swapping program");
            push_program(&mut self.adapter, program, true);
        }
    }

    /// Host callback when a requested frame fires.
    pub fn on_frame(&mut self, handle: PollHandle) -> bool {
        self.monitor
            .on_frame(handle, &mut self.adapter, &mut self.sink)
    }

    pub fn instruction_listing(&mut self) -> InstructionListing {
        self.adapter.disassembled_listing()
    }

    pub fn press_key(&mut self, slot: usize) -> bool {
        self.keypad.press(slot, &mut self.adapter)
    }

    pub fn release_key(&mut self, slot: usize) -> bool {
        self.keypad.release(slot, &mut self.adapter)
    }

    fn transition(&mut self, next: RunState) {
        debug!(from = self.run_state.label(), to = next.label(), "run state");
        self.run_state = next;
        self.publish_controls();
    }
}

/// Loads `program` and pushes its speed and flags (flags in document order).
///
/// On a hot swap a failed load leaves the previous program running with its
/// own settings. At session start the failure is only logged and the engine
/// still gets the settings.
fn push_program<E: EngineCalls>(
    adapter: &mut BoundaryAdapter<E>,
    program: &ProgramDescriptor,
    hot_swap: bool,
) -> bool {
    let loaded = match adapter.load_program(&program.filename) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Failed to load program: {e}");
            false
        }
    };
    if !loaded && hot_swap {
        return false;
    }
    adapter.set_speed(program.speed.get());
    for flag in &program.flags {
        adapter.set_flag(&flag.name, flag.enabled);
    }
    loaded
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;
    use crate::probe::ProbeAccessor;
    use crate::scheduler::ManualScheduler;
    use crate::testing::{Call, FakeEngine, RecordingSink, SinkEvent};

    type Controller = SessionController<FakeEngine, RecordingSink, ManualScheduler>;

    fn controller() -> Controller {
        SessionController::new(
            &ConsoleConfig::default(),
            FakeEngine::default(),
            RecordingSink::default(),
            ManualScheduler::new(),
        )
    }

    fn pong() -> ProgramDescriptor {
        ProgramDescriptor::new("Pong", "pong.ch8", NonZeroU32::new(10).unwrap())
            .with_flag("shift", true)
            .with_flag("clip", false)
    }

    fn tetris() -> ProgramDescriptor {
        ProgramDescriptor::new("Tetris", "tetris.ch8", NonZeroU32::new(12).unwrap())
            .with_flag("wrapQuirk", true)
    }

    fn engine(c: &Controller) -> &FakeEngine {
        c.adapter().engine()
    }

    fn pending_frames(c: &Controller) -> usize {
        c.monitor().scheduler().pending_len()
    }

    #[test]
    fn start_pushes_program_in_order_then_monitors() {
        let mut c = controller();
        c.select_program(Some(pong()));
        assert!(engine(&c).calls.is_empty());

        assert_eq!(c.press_start(), RunState::Running);

        let calls = &engine(&c).calls;
        assert_eq!(
            calls[..5],
            [
                Call::Load(b"roms/pong.ch8\0".to_vec()),
                Call::Speed(10),
                Call::Flag("setShift".into(), 1),
                Call::Flag("setClip".into(), 0),
                Call::Start,
            ]
        );
        assert!(calls[5..].iter().all(Call::is_read));
        assert!(!calls[5..].is_empty());
        assert!(c.is_monitoring());
        assert_eq!(pending_frames(&c), 1);
    }

    #[test]
    fn start_again_stops_with_final_refresh() {
        let mut c = controller();
        c.select_program(Some(pong()));
        c.press_start();
        c.adapter_mut().engine_mut().clear();
        c.adapter_mut()
            .engine_mut()
            .set_probe(ProbeAccessor::ProgramCounter, 0x204);

        assert_eq!(c.press_start(), RunState::Stopped);
        let calls = &engine(&c).calls;
        assert_eq!(calls[0], Call::Stop);
        assert!(calls[1..].iter().all(Call::is_read));
        assert!(!c.is_monitoring());
        assert_eq!(pending_frames(&c), 0);
        assert_eq!(c.monitor().reading("pc").map(|r| r.text()), Some("0x0204"));
    }

    #[test]
    fn stop_from_paused_clears_pause() {
        let mut c = controller();
        c.select_program(Some(pong()));
        c.press_start();
        c.press_pause();
        assert_eq!(c.press_start(), RunState::Stopped);
        assert_eq!(
            c.sink().events[c.sink().events.len() - 2..],
            [SinkEvent::StartButton(false), SinkEvent::PauseButton(false, false)]
        );
    }

    #[test]
    fn pause_resume_alternates() {
        let mut c = controller();
        c.select_program(Some(pong()));
        c.press_start();

        for _ in 0..3 {
            c.adapter_mut().engine_mut().clear();
            assert_eq!(c.press_pause(), RunState::Paused);
            assert!(!c.is_monitoring());
            assert_eq!(pending_frames(&c), 0);
            assert_eq!(engine(&c).commands(), vec![Call::Pause]);

            c.adapter_mut().engine_mut().clear();
            assert_eq!(c.press_pause(), RunState::Running);
            assert!(c.is_monitoring());
            assert_eq!(pending_frames(&c), 1);
            assert_eq!(engine(&c).commands(), vec![Call::Resume]);
        }
    }

    #[test]
    fn pause_while_stopped_does_nothing() {
        let mut c = controller();
        assert_eq!(c.press_pause(), RunState::Stopped);
        assert!(engine(&c).calls.is_empty());
        assert!(c.sink().events.is_empty());
    }

    #[test]
    fn button_state_follows_transitions() {
        let mut c = controller();
        c.select_program(Some(pong()));
        c.press_start();
        c.press_pause();
        let controls: Vec<_> = c
            .sink()
            .events
            .iter()
            .filter(|e| matches!(e, SinkEvent::StartButton(_) | SinkEvent::PauseButton(..)))
            .cloned()
            .collect();
        assert_eq!(
            controls,
            vec![
                SinkEvent::StartButton(true),
                SinkEvent::PauseButton(false, true),
                SinkEvent::StartButton(true),
                SinkEvent::PauseButton(true, true),
            ]
        );
    }

    #[test]
    fn selecting_while_stopped_only_records() {
        let mut c = controller();
        c.select_program(Some(tetris()));
        assert_eq!(c.active_program().map(|p| p.title.as_str()), Some("Tetris"));
        assert!(engine(&c).calls.is_empty());
    }

    #[test]
    fn hot_swap_while_running_keeps_state() {
        let mut c = controller();
        c.select_program(Some(pong()));
        c.press_start();
        c.adapter_mut().engine_mut().clear();

        c.select_program(Some(tetris()));
        assert_eq!(c.run_state(), RunState::Running);
        assert!(c.is_monitoring());
        assert_eq!(
            engine(&c).calls,
            vec![
                Call::Load(b"roms/tetris.ch8\0".to_vec()),
                Call::Speed(12),
                Call::Flag("setWrapQuirk".into(), 1),
            ]
        );
    }

    #[test]
    fn hot_swap_while_paused_keeps_state() {
        let mut c = controller();
        c.select_program(Some(pong()));
        c.press_start();
        c.press_pause();
        c.select_program(Some(tetris()));
        assert_eq!(c.run_state(), RunState::Paused);
        assert!(!c.is_monitoring());
    }

    #[test]
    fn failed_hot_swap_keeps_previous_program_settings() {
        let mut c = controller();
        c.select_program(Some(pong()));
        c.press_start();
        c.adapter_mut().engine_mut().clear();
        c.adapter_mut().engine_mut().fail_loads = true;

        c.select_program(Some(tetris()));
        assert_eq!(c.run_state(), RunState::Running);
        assert_eq!(
            engine(&c).calls,
            vec![Call::Load(b"roms/tetris.ch8\0".to_vec())]
        );
    }

    #[test]
    fn failed_load_at_start_still_starts() {
        let mut c = controller();
        c.adapter_mut().engine_mut().fail_loads = true;
        c.select_program(Some(pong()));
        assert_eq!(c.press_start(), RunState::Running);
        let commands = engine(&c).commands();
        assert_eq!(commands[1], Call::Speed(10));
        assert_eq!(commands.last(), Some(&Call::Start));
    }

    #[test]
    fn start_without_program_still_runs() {
        let mut c = controller();
        assert_eq!(c.press_start(), RunState::Running);
        assert_eq!(engine(&c).commands(), vec![Call::Start]);
    }

    #[test]
    fn frames_drive_refresh_until_paused() {
        let mut c = controller();
        c.select_program(Some(pong()));
        c.press_start();

        let h = c.monitor_mut().scheduler_mut().fire_next().unwrap();
        c.adapter_mut().engine_mut().set_register(1, 9);
        c.sink_mut().clear();
        assert!(c.on_frame(h));
        assert_eq!(c.sink().renders(), vec![("v1".to_string(), "0x09".to_string())]);

        let h = c.monitor().scheduler().pending().next().unwrap();
        c.press_pause();
        assert!(!c.on_frame(h));
    }

    #[test]
    fn keypad_goes_through_controller() {
        let mut c = controller();
        assert!(c.press_key(0));
        assert!(c.release_key(0));
        assert!(!c.release_key(0));
        assert_eq!(
            engine(&c).calls,
            vec![Call::Key(u32::from('1'), true), Call::Key(u32::from('1'), false)]
        );
    }

    #[test]
    fn listing_comes_from_engine() {
        let mut c = controller();
        c.adapter_mut().engine_mut().listing = "0x0200: CLS\n".into();
        let listing = c.instruction_listing();
        assert_eq!(listing.lines(), ["0x0200: CLS".to_string()]);
    }
}
