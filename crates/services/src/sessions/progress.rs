/// Aggregated view of quiz progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    /// 1-based position of the visible item.
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    pub is_last: bool,
}

impl SessionProgress {
    /// Share of the quiz reached so far, counting the visible item.
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.position as f64 / self.total as f64;
        ratio * 100.0
    }
}
