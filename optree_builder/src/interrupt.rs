use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Cooperative shutdown for long-running command handlers.
///
/// A background listener waits for Ctrl-C (and `SIGTERM` on unix), cancelling the shared token when one arrives.
/// Handlers poll [`InterruptContext::is_cancelled`] or await [`CancellationToken::cancelled`] on a [`InterruptContext::token`].
///
/// ### Example
/// ```no_run
/// # use optree_builder as optree;
/// use optree::InterruptContext;
///
/// # async fn work() {}
/// # async fn run() {
/// let context = InterruptContext::listen();
/// let token = context.token();
///
/// tokio::select! {
///     _ = work() => context.cancel(),
///     _ = token.cancelled() => {}
/// }
///
/// context.done().await;
/// # }
/// ```
#[derive(Debug)]
pub struct InterruptContext {
    token: CancellationToken,
    done: oneshot::Receiver<()>,
}

impl InterruptContext {
    /// Spawn the listener onto the current tokio runtime.
    ///
    /// Panics when called outside of a runtime (as [`tokio::spawn`]).
    pub fn listen() -> Self {
        let token = CancellationToken::new();
        let listener = token.clone();
        let (sender, done) = oneshot::channel();

        tokio::spawn(async move {
            tokio::select! {
                _ = interrupted() => {
                    debug!("Interrupt received, cancelling.");
                    listener.cancel();
                }
                _ = listener.cancelled() => {
                    debug!("Cancelled without an interrupt.");
                }
            }

            // The context may already be gone.
            let _ = sender.send(());
        });

        Self { token, done }
    }

    /// A handle on the shared cancellation token.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancel as if interrupted, stopping the listener.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[allow(missing_docs)]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait for the listener to finish (after an interrupt, or any cancellation of the token).
    pub async fn done(self) {
        let _ = self.done.await;
    }
}

async fn interrupted() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(error) => {
                debug!("Cannot listen for SIGTERM: {error}");
                ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c().await;
    }
}

// Never completes when the handler cannot be installed.
async fn ctrl_c() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        debug!("Cannot listen for Ctrl-C: {error}");
        std::future::pending::<()>().await;
    }
}
