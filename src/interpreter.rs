//! # interpreter
//!
//! Owns the machine state and memory, borrows the devices, and runs the
//! three clocks (instruction cycle, delay timer, sound timer) off one
//! scheduler:
//!
//! ```text
//! cycle  -- fetch the word at PC, decode it, execute it
//! delay  -- DT counts down; the screen is presented and keys polled
//! sound  -- ST counts down; the beeper follows whether ST is non-zero
//! ```
//!
//! Everything goes through `&mut self`, so ticks are strictly serialised.
use crate::config::Config;
use crate::decoder::{decode, DecodedInstruction};
use crate::display::Display;
use crate::error::MachineError;
use crate::executor::{execute, Bus};
use crate::input::Keypad;
use crate::memory::{Chip8MemoryMap, MemoryMap};
use crate::opcode::{check_table, OPCODE_TABLE};
use crate::random::{std_rng, RandomSource};
use crate::sound::Sound;
use crate::state::MachineState;
use crate::timer::{Scheduler, Tick};
use log::{debug, info};
use std::io;
use std::time::{Duration, Instant};

/// longest the main loop will sleep before checking for quit
const MAX_IDLE: Duration = Duration::from_millis(50);

pub struct Chip8Interpreter<'a> {
    state: MachineState,
    memory: Chip8MemoryMap,
    display: &'a mut dyn Display,
    input: &'a mut dyn Keypad,
    sound: &'a mut dyn Sound,
    random: Box<dyn RandomSource>,
    scheduler: Scheduler,
    sound_on: bool,
    cycles: u64,
}

impl<'a> Chip8Interpreter<'a> {
    pub fn new(
        display: &'a mut dyn Display,
        input: &'a mut dyn Keypad,
        sound: &'a mut dyn Sound,
        config: &Config,
    ) -> Result<Chip8Interpreter<'a>, MachineError> {
        config.validate()?;
        check_table(&OPCODE_TABLE)?;
        let random: Box<dyn RandomSource> = Box::new(std_rng(config.seed));
        Ok(Chip8Interpreter {
            state: MachineState::new(),
            memory: Chip8MemoryMap::new()?,
            display,
            input,
            sound,
            random,
            scheduler: Scheduler::new(config),
            sound_on: false,
            cycles: 0,
        })
    }

    /// swap in another RND source
    pub fn with_random(mut self, random: Box<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    /// load a chip8 program
    pub fn load_program(&mut self, reader: &mut dyn io::Read) -> Result<usize, MachineError> {
        self.memory.load_program(reader)
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut MachineState {
        &mut self.state
    }

    pub fn memory(&self) -> &Chip8MemoryMap {
        &self.memory
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// fetch, decode and execute one instruction
    pub fn cycle(&mut self) -> Result<DecodedInstruction, MachineError> {
        let word = self.memory.get_word(self.state.program_counter)?;
        let instruction = decode(word);
        let mut bus = Bus {
            memory: &mut self.memory,
            display: &mut *self.display,
            keypad: &mut *self.input,
            random: self.random.as_mut(),
        };
        execute(&instruction, &mut self.state, &mut bus)?;
        self.cycles += 1;
        Ok(instruction)
    }

    /// one delay timer period
    pub fn delay_tick(&mut self) -> Result<(), MachineError> {
        self.state.tick_delay();
        self.display.present()?;
        self.input.poll()?;
        Ok(())
    }

    /// one sound timer period; the beeper only hears about transitions
    pub fn sound_tick(&mut self) -> Result<(), MachineError> {
        let remaining = self.state.tick_sound();
        if remaining > 0 && !self.sound_on {
            self.sound.beep()?;
            self.sound_on = true;
        } else if remaining == 0 && self.sound_on {
            self.sound.stop()?;
            self.sound_on = false;
        }
        Ok(())
    }

    pub fn start(&mut self, now: Duration) {
        self.scheduler.start(now);
    }

    /// halt all three clocks and silence the beeper; fine to call twice
    pub fn stop(&mut self) -> Result<(), MachineError> {
        self.scheduler.stop();
        if self.sound_on {
            self.sound.stop()?;
            self.sound_on = false;
        }
        Ok(())
    }

    /// run every tick due up to `now`, in order
    pub fn advance_to(&mut self, now: Duration) -> Result<(), MachineError> {
        while let Some(tick) = self.scheduler.pop_due(now) {
            match tick {
                Tick::Cycle => {
                    self.cycle()?;
                }
                Tick::Delay => self.delay_tick()?,
                Tick::Sound => self.sound_tick()?,
            }
        }
        Ok(())
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    /// Run in real time until the keypad asks to quit or `max_cycles`
    /// instructions have executed.
    pub fn main_loop(&mut self, max_cycles: Option<u64>) -> Result<(), MachineError> {
        let epoch = Instant::now();
        self.start(Duration::ZERO);
        info!("running from 0x{:03x}", self.state.program_counter);
        let result = self.run_until_done(epoch, max_cycles);
        self.stop()?;
        debug!("stopped after {} cycles", self.cycles);
        result
    }

    fn run_until_done(&mut self, epoch: Instant, max_cycles: Option<u64>) -> Result<(), MachineError> {
        loop {
            self.advance_to(epoch.elapsed())?;
            if self.input.quit_requested() {
                info!("quit requested");
                return Ok(());
            }
            if matches!(max_cycles, Some(max) if self.cycles >= max) {
                return Ok(());
            }
            let now = epoch.elapsed();
            let wait = self
                .next_deadline()
                .map_or(MAX_IDLE, |due| due.saturating_sub(now))
                .min(MAX_IDLE);
            if !wait.is_zero() {
                spin_sleep::sleep(wait);
            }
        }
    }
}
