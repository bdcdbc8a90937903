use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Exit status used when a second signal forces the process down.
pub const FORCED_EXIT_CODE: i32 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Interrupt,
    Terminate,
}

/// How a supervised task came to an end.
#[derive(Debug)]
pub enum Shutdown<T> {
    /// The task returned without being asked to stop.
    Finished(T),
    /// A signal arrived and the task completed its shutdown branch.
    Stopped { reason: ShutdownReason, output: T },
    /// A second signal arrived while stopping; the task was aborted.
    Forced { reason: ShutdownReason },
}

/// Forwards every SIGINT and SIGTERM as a `ShutdownReason`.
///
/// Handlers are installed before this returns, so a signal delivered right
/// after the call is not lost.
pub fn spawn_signal_listener() -> std::io::Result<mpsc::Receiver<ShutdownReason>> {
    let (tx, rx) = mpsc::channel(4);

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut interrupt = signal(SignalKind::interrupt())?;
        let mut terminate = signal(SignalKind::terminate())?;

        tokio::spawn(async move {
            loop {
                let reason = tokio::select! {
                    Some(()) = interrupt.recv() => ShutdownReason::Interrupt,
                    Some(()) = terminate.recv() => ShutdownReason::Terminate,
                    else => break,
                };
                info!("Received {:?}", reason);
                if tx.send(reason).await.is_err() {
                    break;
                }
            }
        });
    }

    #[cfg(not(unix))]
    {
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                info!("Received {:?}", ShutdownReason::Interrupt);
                if tx.send(ShutdownReason::Interrupt).await.is_err() {
                    break;
                }
            }
        });
    }

    Ok(rx)
}

/// Blocks until `task` has finished.
///
/// The first signal cancels `token` exactly once and waits for the task to
/// acknowledge. A second signal aborts the task instead of waiting on it.
pub async fn supervise<T>(
    token: CancellationToken,
    mut task: JoinHandle<T>,
    signals: &mut mpsc::Receiver<ShutdownReason>,
) -> Result<Shutdown<T>, JoinError>
where
    T: Send + 'static,
{
    let first = tokio::select! {
        output = &mut task => return Ok(Shutdown::Finished(output?)),
        reason = signals.recv() => reason,
    };

    let Some(reason) = first else {
        // No more signals can arrive; the task decides when we are done.
        return Ok(Shutdown::Finished(task.await?));
    };

    info!("Shutting down ({:?}), waiting for the current tick to finish", reason);
    token.cancel();

    tokio::select! {
        output = &mut task => Ok(Shutdown::Stopped { reason, output: output? }),
        Some(second) = signals.recv() => {
            warn!("Second signal ({:?}) while stopping, aborting", second);
            task.abort();
            error!("Sampler aborted while a device call was in flight");
            Ok(Shutdown::Forced { reason: second })
        }
    }
}
