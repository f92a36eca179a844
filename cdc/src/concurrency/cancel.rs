use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Cooperative one-shot cancellation token.
///
/// [`CancellationSignal`] wraps a [`CancellationToken`] which starts unset and can be set
/// exactly once. Any clone can trigger it and any clone can wait for it, which decouples who
/// requests a shutdown (an operating system interrupt, a failing worker, a caller) from who must
/// react to it (the worker loops).
///
/// A signal derived with [`CancellationSignal::child`] is also considered triggered once any of
/// its ancestors is triggered, while triggering the child leaves the ancestors untouched. This is
/// how a pipeline run is bound to the cancellation scope of its caller.
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    token: CancellationToken,
    triggered: Arc<AtomicBool>,
}

impl CancellationSignal {
    /// Creates a new root signal in the untriggered state.
    pub fn new() -> Self {
        Self::from_token(CancellationToken::new())
    }

    /// Derives a signal which fires when either itself or `self` (or any ancestor of `self`)
    /// fires.
    pub fn child(&self) -> Self {
        Self::from_token(self.token.child_token())
    }

    /// Triggers the signal.
    ///
    /// Idempotent and safe to call concurrently. Returns `true` only for the first call on this
    /// signal or any of its clones.
    pub fn trigger(&self) -> bool {
        let already_triggered = self.triggered.swap(true, Ordering::AcqRel);
        self.token.cancel();

        !already_triggered
    }

    /// Returns whether the signal, or any of its ancestors, has been triggered.
    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits until the signal, or any of its ancestors, is triggered.
    ///
    /// Resolves immediately if the signal is already triggered. Dropping the returned future
    /// stops waiting, so the wait can be raced against other work.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[test]
    fn trigger_is_one_shot() {
        let signal = CancellationSignal::new();
        assert!(!signal.is_triggered());

        assert!(signal.trigger());
        assert!(!signal.trigger());
        assert!(signal.is_triggered());
        assert!(signal.clone().is_triggered());
    }

    #[test]
    fn child_observes_parent_but_not_the_other_way_around() {
        let parent = CancellationSignal::new();
        let child = parent.child();
        let sibling = parent.child();

        child.trigger();
        assert!(child.is_triggered());
        assert!(!parent.is_triggered());
        assert!(!sibling.is_triggered());

        parent.trigger();
        assert!(sibling.is_triggered());
    }

    #[test]
    fn triggering_a_child_reports_its_own_transition() {
        let parent = CancellationSignal::new();
        let child = parent.child();

        parent.trigger();
        assert!(child.is_triggered());

        assert!(child.trigger());
        assert!(!child.clone().trigger());
    }

    #[tokio::test]
    async fn repeated_waits_on_a_child_resolve_after_parent_trigger() {
        let parent = CancellationSignal::new();
        let child = parent.child().child();
        parent.trigger();

        for _ in 0..1000 {
            timeout(Duration::from_millis(100), child.cancelled())
                .await
                .expect("a triggered scope must resolve every wait immediately");
        }
    }

    #[test]
    fn grandchild_observes_root() {
        let root = CancellationSignal::new();
        let grandchild = root.child().child();

        root.trigger();
        assert!(grandchild.is_triggered());
    }

    #[tokio::test]
    async fn cancelled_resolves_immediately_when_already_triggered() {
        let signal = CancellationSignal::new();
        signal.trigger();

        timeout(Duration::from_millis(100), signal.cancelled())
            .await
            .expect("an already triggered signal must resolve immediately");
    }

    #[tokio::test]
    async fn cancelled_wakes_up_on_concurrent_trigger() {
        let signal = CancellationSignal::new();

        let waiter = tokio::spawn({
            let signal = signal.clone();
            async move { signal.cancelled().await }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        signal.trigger();
        timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter must be woken up")
            .unwrap();
    }

    #[tokio::test]
    async fn child_wait_wakes_up_on_parent_trigger() {
        let parent = CancellationSignal::new();
        let child = parent.child();

        let waiter = tokio::spawn(async move { child.cancelled().await });

        parent.trigger();
        timeout(Duration::from_secs(1), waiter)
            .await
            .expect("child must observe the parent trigger")
            .unwrap();
    }
}
