//! # timer
//!
//! The machine has three independent clocks: instruction cycles, the delay
//! timer and the sound timer. Rather than three threads poking at shared
//! state, they are periodic deadlines on one virtual timeline; the
//! interpreter asks which tick is due next and handles it to completion
//! before asking again, so a timer decrement can never land halfway through
//! an instruction.
use crate::config::Config;
use log::debug;
use std::time::Duration;

/// A fixed-rate activity that can be stopped and started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Periodic {
    interval: Duration,
    next_due: Option<Duration>,
}

impl Periodic {
    pub fn new(interval: Duration) -> Self {
        Periodic {
            interval,
            next_due: None,
        }
    }

    /// first tick one interval after `now`; no-op when already running
    pub fn start(&mut self, now: Duration) {
        if self.next_due.is_none() {
            self.next_due = Some(now + self.interval);
        }
    }

    /// no-op when already stopped
    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.next_due
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// consume one tick if it's due by `now`
    fn fire(&mut self, now: Duration) -> bool {
        match self.next_due {
            Some(due) if due <= now => {
                self.next_due = Some(due + self.interval);
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Delay,
    Sound,
    Cycle,
}

/// The three machine clocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheduler {
    delay: Periodic,
    sound: Periodic,
    cycle: Periodic,
}

impl Scheduler {
    pub fn new(config: &Config) -> Self {
        Scheduler {
            delay: Periodic::new(config.delay_interval),
            sound: Periodic::new(config.sound_interval),
            cycle: Periodic::new(config.cycle_interval),
        }
    }

    fn drivers(&self) -> [(Tick, &Periodic); 3] {
        [
            (Tick::Delay, &self.delay),
            (Tick::Sound, &self.sound),
            (Tick::Cycle, &self.cycle),
        ]
    }

    pub fn driver(&self, tick: Tick) -> &Periodic {
        match tick {
            Tick::Delay => &self.delay,
            Tick::Sound => &self.sound,
            Tick::Cycle => &self.cycle,
        }
    }

    fn driver_mut(&mut self, tick: Tick) -> &mut Periodic {
        match tick {
            Tick::Delay => &mut self.delay,
            Tick::Sound => &mut self.sound,
            Tick::Cycle => &mut self.cycle,
        }
    }

    pub fn start(&mut self, now: Duration) {
        debug!("starting clocks at {:?}", now);
        self.delay.start(now);
        self.sound.start(now);
        self.cycle.start(now);
    }

    pub fn stop(&mut self) {
        debug!("stopping clocks");
        self.delay.stop();
        self.sound.stop();
        self.cycle.stop();
    }

    pub fn is_running(&self) -> bool {
        self.drivers().iter().any(|(_, p)| p.is_running())
    }

    /// when the soonest tick is due, if anything is running
    pub fn next_deadline(&self) -> Option<Duration> {
        self.drivers().iter().filter_map(|(_, p)| p.next_due()).min()
    }

    /// The earliest tick due by `now`, rescheduled one interval on. Ties go
    /// to the timers before the cycle.
    pub fn pop_due(&mut self, now: Duration) -> Option<Tick> {
        let tick = self
            .drivers()
            .iter()
            .filter_map(|(t, p)| p.next_due().filter(|due| *due <= now).map(|due| (due, *t)))
            .min_by_key(|(due, _)| *due)
            .map(|(_, t)| t)?;
        self.driver_mut(tick).fire(now);
        Some(tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn scheduler() -> Scheduler {
        Scheduler::new(&Config {
            cycle_interval: ms(2),
            delay_interval: ms(10),
            sound_interval: ms(10),
            seed: None,
        })
    }

    fn drain(s: &mut Scheduler, now: Duration) -> Vec<Tick> {
        std::iter::from_fn(|| s.pop_due(now)).collect()
    }

    #[test]
    fn test_nothing_due_before_start() {
        let mut s = scheduler();
        assert!(!s.is_running());
        assert_eq!(s.next_deadline(), None);
        assert_eq!(s.pop_due(ms(1000)), None);
    }

    #[test]
    fn test_ticks_in_time_order() {
        let mut s = scheduler();
        s.start(ms(0));
        let ticks = drain(&mut s, ms(10));
        // cycles at 2,4,6,8 then at 10 the timers go before the cycle
        assert_eq!(
            ticks,
            vec![
                Tick::Cycle,
                Tick::Cycle,
                Tick::Cycle,
                Tick::Cycle,
                Tick::Delay,
                Tick::Sound,
                Tick::Cycle
            ]
        );
        assert_eq!(s.next_deadline(), Some(ms(12)));
    }

    #[test]
    fn test_rates_independent() {
        let mut s = scheduler();
        s.start(ms(0));
        let ticks = drain(&mut s, ms(100));
        assert_eq!(ticks.iter().filter(|t| **t == Tick::Cycle).count(), 50);
        assert_eq!(ticks.iter().filter(|t| **t == Tick::Delay).count(), 10);
        assert_eq!(ticks.iter().filter(|t| **t == Tick::Sound).count(), 10);
    }

    #[test]
    fn test_start_twice_keeps_schedule() {
        let mut p = Periodic::new(ms(5));
        p.start(ms(0));
        p.start(ms(3));
        assert_eq!(p.next_due(), Some(ms(5)));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut s = scheduler();
        s.stop();
        s.start(ms(0));
        s.stop();
        s.stop();
        assert!(!s.is_running());
        assert_eq!(s.pop_due(ms(50)), None);
    }

    #[test]
    fn test_restart_after_stop() {
        let mut s = scheduler();
        s.start(ms(0));
        s.stop();
        s.start(ms(40));
        assert_eq!(s.driver(Tick::Delay).next_due(), Some(ms(50)));
        assert_eq!(s.next_deadline(), Some(ms(42)));
    }
}
