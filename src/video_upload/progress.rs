/// Upload progress in percent. The backend reports none, so progress is
/// advanced on a timer up to a cap and jumps to 100 on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UploadProgress(u8);

impl UploadProgress {
    pub const COMPLETE: UploadProgress = UploadProgress(100);

    pub fn percent(&self) -> u8 {
        self.0
    }

    pub fn advance(self, step: u8, cap: u8) -> Self {
        if self.0 < cap {
            UploadProgress(self.0.saturating_add(step).min(100))
        } else {
            self
        }
    }
}
