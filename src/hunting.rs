use crate::constants::hunting_ticks_for_level;
use crate::types::HuntingPhase;

pub const PHASE_COUNT: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseChange {
    pub phase_index: u8,
    pub phase: HuntingPhase,
}

/// Scatter/chase scheduler. Even phase indices scatter, odd ones chase; the
/// last phase never ends.
#[derive(Clone, Debug)]
pub struct HuntingTimer {
    durations: [Option<u32>; PHASE_COUNT],
    phase_index: u8,
    elapsed: u32,
    running: bool,
}

impl HuntingTimer {
    /// Tick count of a phase, `None` meaning it runs until the level ends.
    pub fn duration(level_number: u32, phase_index: usize) -> Option<u32> {
        hunting_ticks_for_level(level_number)
            .get(phase_index)
            .copied()
            .flatten()
    }

    pub fn for_level(level_number: u32) -> Self {
        Self {
            durations: *hunting_ticks_for_level(level_number),
            phase_index: 0,
            elapsed: 0,
            running: false,
        }
    }

    /// Back to the first scatter phase. Does not change the running flag.
    pub fn reset(&mut self) {
        self.phase_index = 0;
        self.elapsed = 0;
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn phase_index(&self) -> u8 {
        self.phase_index
    }

    pub fn phase(&self) -> HuntingPhase {
        if self.phase_index.is_multiple_of(2) {
            HuntingPhase::Scatter
        } else {
            HuntingPhase::Chase
        }
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn remaining(&self) -> Option<u32> {
        self.durations[self.phase_index as usize].map(|d| d.saturating_sub(self.elapsed))
    }

    pub fn tick(&mut self) -> Option<PhaseChange> {
        if !self.running {
            return None;
        }
        let Some(duration) = self.durations[self.phase_index as usize] else {
            self.elapsed = self.elapsed.saturating_add(1);
            return None;
        };
        self.elapsed += 1;
        if self.elapsed < duration {
            return None;
        }
        self.phase_index += 1;
        self.elapsed = 0;
        Some(PhaseChange {
            phase_index: self.phase_index,
            phase: self.phase(),
        })
    }
}
