use crate::device_display::interface::DeviceDisplay;
use crate::library::logger::interface::Logger;
use std::error::Error;
use std::sync::{Arc, Mutex, PoisonError};

/// Keeps the last presented screen so tests can read it back.
pub struct DeviceDisplayFake {
    logger: Arc<dyn Logger + Send + Sync>,
    pending: Vec<String>,
    presented: Arc<Mutex<Vec<String>>>,
}

impl DeviceDisplayFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("display").with_namespace("fake"),
            pending: vec![],
            presented: Arc::new(Mutex::new(vec![])),
        }
    }

    /// A view of the presented screen that stays valid after the display is
    /// moved into the runtime.
    pub fn screen(&self) -> Arc<Mutex<Vec<String>>> {
        self.presented.clone()
    }
}

impl DeviceDisplay for DeviceDisplayFake {
    fn init(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.logger.info("DeviceDisplayFake::init()")?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.pending.clear();
        Ok(())
    }

    fn write_line(&mut self, line: usize, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        if line >= self.num_lines() {
            return Err("Invalid line number".into());
        }
        if self.pending.len() <= line {
            self.pending.resize(line + 1, String::new());
        }
        let width = self.chars_per_line();
        self.pending[line] = text.chars().take(width).collect();
        Ok(())
    }

    fn present(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.logger
            .info(&format!("DeviceDisplayFake::present({:?})", self.pending))?;
        *self.presented.lock().unwrap_or_else(PoisonError::into_inner) = self.pending.clone();
        Ok(())
    }
}
