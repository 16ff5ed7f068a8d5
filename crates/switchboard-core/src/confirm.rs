// ── Confirmation hook ──
//
// Sync and commands ask before talking to a device the prober believes is
// unreachable. The question is asked through this trait so that the core
// stays free of any terminal or UI code.

/// Asks the user whether to proceed with an operation.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Always proceeds (non-interactive `--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Never proceeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decline;

impl Confirm for Decline {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

/// Adapts a closure into a [`Confirm`].
pub struct ConfirmFn<F>(pub F);

impl<F> Confirm for ConfirmFn<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        (self.0)(prompt)
    }
}
