//!
//! ## Design
//!
//! * CHIP-8 virtual machine: 4K of memory, V0-VF, a 16 deep call stack,
//!   delay and sound timers, 64x32 monochrome display, 16 key hex keypad
//! * decoding is table driven: an ordered list of (mask, code) pairs, first
//!   match wins, checked for ambiguity when the interpreter is built
//! * the executor never reaches for devices on its own; memory, display,
//!   keypad and random number source are handed to it per instruction
//! * abstract display, input and audio behind traits so alternatives can be
//!   plugged in; starting with TUI in-console
//! * instruction cycles and the two timers run at independent fixed rates
//!   off a single scheduler, never interleaving
//!
//! Model
//!
//! ```text
//! Environment (main.rs)
//!  |-- display, input, audio, config
//!  |-- interpreter(display, input, audio, config)
//!  |    |-- memory map (font + program)
//!  |    |-- machine state
//!  |    `-- scheduler: cycle / delay / sound
//!  `-- main loop
//!       |-- run every tick that is due, earliest first
//!       |     cycle: fetch word at PC -> decode -> execute
//!       |     delay: DT -= 1, present display, poll keys
//!       |     sound: ST -= 1, beep while ST > 0
//!       `-- sleep until the next deadline
//! ```
pub mod config;
pub mod decoder;
pub mod display;
pub mod error;
pub mod executor;
pub mod input;
pub mod interpreter;
pub mod memory;
pub mod opcode;
pub mod random;
pub mod sound;
pub mod state;
pub mod timer;

pub use config::Config;
pub use error::MachineError;
pub use interpreter::Chip8Interpreter;
