/// Runs a cleanup closure when dropped, including during a panic unwind.
///
/// Used to put the terminal back into cooked mode however the TUI exits.
///
/// ```
/// use history_nav::utils::context::Context;
///
/// let _guard = Context::with(|| {
///     println!("terminal restored");
/// });
/// ```
pub struct Context<AtExit: FnOnce()> {
    exit_cb: Option<AtExit>,
}

impl<F: FnOnce()> Context<F> {
    pub fn with(f: F) -> Self {
        Self { exit_cb: Some(f) }
    }
}

impl<F: FnOnce()> Drop for Context<F> {
    fn drop(&mut self) {
        if let Some(f) = self.exit_cb.take() {
            f()
        }
    }
}
