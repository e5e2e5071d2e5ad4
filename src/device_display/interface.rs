use std::error::Error;

/// A fixed-size text panel showing the classifier's status, predictions and
/// annotation state.
pub trait DeviceDisplay: Send + Sync {
    fn init(&mut self) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Clear all text from the panel
    fn clear(&mut self) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Write text to a specific line (0-based index). Text longer than
    /// `chars_per_line` is truncated.
    fn write_line(&mut self, line: usize, text: &str) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Show what has been written since the last `present`
    fn present(&mut self) -> Result<(), Box<dyn Error + Send + Sync>>;

    fn num_lines(&self) -> usize {
        16
    }

    fn chars_per_line(&self) -> usize {
        64
    }
}
