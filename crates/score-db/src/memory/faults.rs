//! Armed failures for the in-memory store

use std::collections::HashMap;

use parking_lot::Mutex;

/// Where an armed fault fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    /// `apply_delta` fails with `InjectedFault` after the ledger append was staged
    ApplyDelta,
    /// `apply_delta` fails with `TransientContention`
    Contention,
    /// `commit` fails before anything becomes visible
    Commit,
}

impl FaultPoint {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ApplyDelta => "apply_delta",
            Self::Contention => "contention",
            Self::Commit => "commit",
        }
    }
}

/// Counts down armed faults; each trip consumes one
#[derive(Debug, Default)]
pub struct FaultInjector {
    armed: Mutex<HashMap<FaultPoint, u32>>,
}

impl FaultInjector {
    /// Make the next `times` visits to `point` fail
    pub fn arm(&self, point: FaultPoint, times: u32) {
        let mut armed = self.armed.lock();
        if times == 0 {
            armed.remove(&point);
        } else {
            armed.insert(point, times);
        }
    }

    pub fn disarm_all(&self) {
        self.armed.lock().clear();
    }

    /// Faults still armed at `point`
    pub fn remaining(&self, point: FaultPoint) -> u32 {
        self.armed.lock().get(&point).copied().unwrap_or(0)
    }

    /// Consume one armed fault; true if the caller must fail
    pub(crate) fn trip(&self, point: FaultPoint) -> bool {
        let mut armed = self.armed.lock();
        match armed.get_mut(&point) {
            Some(left) if *left > 1 => {
                *left -= 1;
                true
            }
            Some(_) => {
                armed.remove(&point);
                true
            }
            None => false,
        }
    }
}
