/// Whole-second countdown for one student's turn.
#[derive(Clone, Debug, PartialEq)]
pub struct Countdown {
    remaining: u32,
    elapsed: f64, // seconds since the last whole-second tick
    expired: bool,
}

impl Countdown {
    pub fn new(secs: u32) -> Self {
        Self {
            remaining: secs,
            elapsed: 0.0,
            expired: false,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Advance by `dt` seconds. Returns true on the call that reaches zero
    /// and never again after that.
    pub fn advance(&mut self, dt: f64) -> bool {
        if self.expired {
            return false;
        }
        self.elapsed += dt.max(0.0);
        while self.remaining > 0 && self.elapsed >= 1.0 {
            self.elapsed -= 1.0;
            self.remaining -= 1;
        }
        self.expired = self.remaining == 0;
        self.expired
    }
}
