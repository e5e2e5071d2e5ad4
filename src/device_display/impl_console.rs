use crate::device_display::interface::DeviceDisplay;
use std::error::Error;

pub struct DeviceDisplayConsole {
    display_buffer: Vec<String>,
}

impl DeviceDisplayConsole {
    pub fn new() -> Self {
        Self {
            display_buffer: vec![],
        }
    }

    fn render_display(&self) {
        let width = self.chars_per_line();
        println!("┌{}┐", "─".repeat(width));
        for row in self.display_buffer.iter().filter(|row| !row.is_empty()) {
            println!("│{:<width$}│", row, width = width);
        }
        println!("└{}┘", "─".repeat(width));
    }
}

impl Default for DeviceDisplayConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceDisplay for DeviceDisplayConsole {
    fn init(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.render_display();
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.display_buffer.clear();
        Ok(())
    }

    fn write_line(&mut self, line: usize, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        if line >= self.num_lines() {
            return Err("Invalid line number".into());
        }
        if self.display_buffer.len() <= line {
            self.display_buffer.resize(line + 1, String::new());
        }
        let width = self.chars_per_line();
        self.display_buffer[line] = text.chars().take(width).collect();
        Ok(())
    }

    fn present(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.render_display();
        Ok(())
    }
}
