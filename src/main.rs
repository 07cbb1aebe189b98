use std::fs::File;
use std::path::PathBuf;

use chip8vm::config::{DEFAULT_CYCLE_HZ, DEFAULT_TIMER_HZ};
use chip8vm::display::{MonoTermDisplay, CHIP8_DISPLAY_HEIGHT, CHIP8_DISPLAY_WIDTH};
use chip8vm::input::StdinInput;
use chip8vm::sound::{Mute, SimpleBeep, Sound};
use chip8vm::{Chip8Interpreter, Config};
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use log::LevelFilter;
use simple_logger::SimpleLogger;

/// Run a CHIP-8 program in the terminal
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// program to load at 0x200
    rom: PathBuf,

    /// instructions per second
    #[arg(long, default_value_t = DEFAULT_CYCLE_HZ)]
    cycle_hz: u32,

    /// delay timer decrements per second
    #[arg(long, default_value_t = DEFAULT_TIMER_HZ)]
    timer_hz: u32,

    /// sound timer decrements per second
    #[arg(long, default_value_t = DEFAULT_TIMER_HZ)]
    sound_hz: u32,

    /// fixed seed for RND
    #[arg(long)]
    seed: Option<u64>,

    /// stop after this many instructions
    #[arg(long)]
    max_cycles: Option<u64>,

    /// no beeping
    #[arg(long)]
    mute: bool,

    /// log more (-v warn, -vv info, -vvv debug, -vvvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Off,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        3 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    SimpleLogger::new().with_level(level).init()?;

    let config =
        Config::from_hz(args.cycle_hz, args.timer_hz, args.sound_hz)?.with_seed(args.seed);

    let mut f = File::open(&args.rom)
        .wrap_err_with(|| format!("couldn't open {}", args.rom.display()))?;

    // initialise
    let mut display = MonoTermDisplay::new(CHIP8_DISPLAY_WIDTH, CHIP8_DISPLAY_HEIGHT)?;
    let mut input = StdinInput::new()?;
    let mut sound: Box<dyn Sound> = if args.mute {
        Box::new(Mute::new())
    } else {
        Box::new(SimpleBeep::new())
    };
    let mut interpreter =
        Chip8Interpreter::new(&mut display, &mut input, sound.as_mut(), &config)?;

    interpreter
        .load_program(&mut f)
        .wrap_err("couldn't load program")?;
    let result = interpreter.main_loop(args.max_cycles);
    drop(interpreter);
    drop(input);

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..2 {
        println!();
    }
    result?;
    Ok(())
}
