use crate::error::MachineError;
use beep::beep;

pub trait Sound {
    fn beep(&mut self) -> Result<(), MachineError>;
    fn stop(&mut self) -> Result<(), MachineError>;
}

const SIMPLEBEEP_PITCH: u16 = 800;

/// square wave through the pc speaker
pub struct SimpleBeep {
    is_beeping: bool,
}

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep { is_beeping: false }
    }
}

impl Default for SimpleBeep {
    fn default() -> Self {
        Self::new()
    }
}

impl Sound for SimpleBeep {
    fn beep(&mut self) -> Result<(), MachineError> {
        beep(SIMPLEBEEP_PITCH).map_err(|e| MachineError::Audio(e.to_string()))?;
        self.is_beeping = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), MachineError> {
        if self.is_beeping {
            beep(0).map_err(|e| MachineError::Audio(e.to_string()))?;
            self.is_beeping = false;
        }
        Ok(())
    }
}

impl Drop for SimpleBeep {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

#[derive(Debug, Default)]
pub struct Mute {}

impl Mute {
    pub fn new() -> Self {
        Mute {}
    }
}

impl Sound for Mute {
    fn beep(&mut self) -> Result<(), MachineError> {
        Ok(())
    }

    fn stop(&mut self) -> Result<(), MachineError> {
        Ok(())
    }
}
