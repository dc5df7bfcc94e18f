//! Wall-clock abstraction the core depends on (spec §1: "the core consumes
//! a persistence abstraction and a wall-clock abstraction"). The DS policy
//! chain's expiration checks read `now` from whichever `Clock` the scan
//! cycle was started with, so the scenario tests that sign RRSIGs against a
//! specific inception/expiration window (spec §8 S2, S6) can pin `now` via
//! `FixedClock` instead of racing real time.

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
