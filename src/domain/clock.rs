use crate::domain::job::Ticks;

/// Monotonic tick counter of one simulation run. Starts at 0.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    tick: Ticks,
}

impl Clock {
    pub fn new() -> Self {
        Self { tick: 0 }
    }

    pub fn now(&self) -> Ticks {
        self.tick
    }

    pub fn up(&mut self) {
        self.tick += 1;
    }
}
