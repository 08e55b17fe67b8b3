//! Telemetry Monitor: change-only probe polling bound to display refresh.
//!
//! The monitor owns the probe readings and the live [`PollHandle`]. Each pass
//! reads every probe in construction order and forwards only the values that
//! changed; the per-frame cost stays at one boundary read per probe plus the
//! sink calls for real changes. Skipping equal values is what keeps a frame
//! cheap, so [`ProbeReading::observe`] is the only path to the sink.

use tracing::{debug, trace};

use crate::boundary::{BoundaryAdapter, EngineCalls};
use crate::config::ConsoleConfig;
use crate::listing::entry_for_address;
use crate::probe::{probe_set, ProbeDefinition, ProbeReading, PC_PROBE, SP_PROBE};
use crate::scheduler::{FrameScheduler, PollHandle};
use crate::sink::PresentationSink;

pub struct TelemetryMonitor<F> {
    probes: Vec<(ProbeDefinition, ProbeReading)>,
    stack_size: usize,
    program_start: u32,
    memory_size: u32,
    scheduler: F,
    poll_handle: Option<PollHandle>,
}

impl<F: FrameScheduler> TelemetryMonitor<F> {
    pub fn new(cfg: &ConsoleConfig, scheduler: F) -> Self {
        let probes = probe_set(cfg.register_count, cfg.stack_size)
            .into_iter()
            .map(|def| (def, ProbeReading::default()))
            .collect();
        Self {
            probes,
            stack_size: cfg.stack_size,
            program_start: cfg.program_start,
            memory_size: cfg.memory_size,
            scheduler,
            poll_handle: None,
        }
    }

    pub fn probes(&self) -> impl Iterator<Item = (&ProbeDefinition, &ProbeReading)> {
        self.probes.iter().map(|(d, r)| (d, r))
    }

    pub fn reading(&self, identifier: &str) -> Option<&ProbeReading> {
        self.probes
            .iter()
            .find(|(d, _)| d.identifier == identifier)
            .map(|(_, r)| r)
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }

    pub fn is_monitoring(&self) -> bool {
        self.poll_handle.is_some()
    }

    /// Reads every probe and renders the ones that changed, then moves the
    /// stack highlight and the current-instruction marker using the values
    /// read in this same pass. Returns how many probes were rendered.
    pub fn update_all<E, S>(&mut self, adapter: &mut BoundaryAdapter<E>, sink: &mut S) -> usize
    where
        E: EngineCalls,
        S: PresentationSink + ?Sized,
    {
        let mut rendered = 0;
        for (def, reading) in &mut self.probes {
            let value = adapter.read_probe(def.accessor);
            if reading.observe(value, def.width) {
                sink.render_value(&def.identifier, reading.text());
                rendered += 1;
            }
        }

        let sp = self.probes[SP_PROBE].1.value().unwrap_or(0) as usize;
        let highlight = (sp < self.stack_size).then_some(sp);
        sink.set_stack_highlight(highlight);

        let pc = self.probes[PC_PROBE].1.value().unwrap_or(0);
        let entry = entry_for_address(pc, self.program_start, self.memory_size);
        sink.set_current_instruction(pc, entry);

        trace!(rendered, "telemetry pass");
        rendered
    }

    /// Refreshes once now and keeps refreshing on every following frame until
    /// cancelled. A loop that is already live is replaced, never doubled.
    pub fn start_monitoring<E, S>(&mut self, adapter: &mut BoundaryAdapter<E>, sink: &mut S)
    where
        E: EngineCalls,
        S: PresentationSink + ?Sized,
    {
        self.cancel_monitoring();
        self.update_all(adapter, sink);
        self.poll_handle = Some(self.scheduler.request_frame());
        debug!("monitoring started");
    }

    /// Host callback for a fired frame. Stale handles (cancelled, or from a
    /// replaced loop) are ignored and return `false`.
    pub fn on_frame<E, S>(
        &mut self,
        handle: PollHandle,
        adapter: &mut BoundaryAdapter<E>,
        sink: &mut S,
    ) -> bool
    where
        E: EngineCalls,
        S: PresentationSink + ?Sized,
    {
        if self.poll_handle != Some(handle) {
            trace!(handle = handle.raw(), "stale frame ignored");
            return false;
        }
        self.poll_handle = None;
        self.update_all(adapter, sink);
        self.poll_handle = Some(self.scheduler.request_frame());
        true
    }

    /// Drops the next scheduled frame. Returns whether a loop was live; calling
    /// it with nothing scheduled is fine.
    pub fn cancel_monitoring(&mut self) -> bool {
        match self.poll_handle.take() {
            Some(handle) => {
                self.scheduler.cancel_frame(handle);
                debug!("monitoring cancelled");
                true
            }
            None => false,
        }
    }
}
