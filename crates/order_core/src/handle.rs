//! Command queue in front of an [`OrderSession`] running on its own task.

use shared::error::OrderError;
use tokio::{
    sync::{
        mpsc::{self, error::TrySendError},
        oneshot,
    },
    task::JoinHandle,
};
use tracing::debug;

use crate::session::{OrderSession, SessionCommand, SessionUpdate};

type Reply = oneshot::Sender<Result<SessionUpdate, OrderError>>;

struct Envelope {
    command: SessionCommand,
    reply: Reply,
}

/// Cloneable sender side of a running session. Commands from every clone are
/// applied one at a time in arrival order.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Envelope>,
}

impl SessionHandle {
    /// Moves the session onto a task. The task hands the session back once every
    /// handle is dropped.
    pub fn spawn(session: OrderSession, capacity: usize) -> (Self, JoinHandle<OrderSession>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let task = tokio::spawn(run_session(session, rx));
        (Self { tx }, task)
    }

    /// Queues a command, waiting for room if the queue is full.
    pub async fn dispatch(&self, command: SessionCommand) -> Result<SessionUpdate, OrderError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Envelope { command, reply })
            .await
            .map_err(|_| OrderError::SessionClosed)?;
        rx.await.map_err(|_| OrderError::SessionClosed)?
    }

    /// Queues a command or fails immediately with `QueueFull`.
    pub async fn try_dispatch(&self, command: SessionCommand) -> Result<SessionUpdate, OrderError> {
        let (reply, rx) = oneshot::channel();
        match self.tx.try_send(Envelope { command, reply }) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => return Err(OrderError::QueueFull),
            Err(TrySendError::Closed(_)) => return Err(OrderError::SessionClosed),
        }
        rx.await.map_err(|_| OrderError::SessionClosed)?
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

async fn run_session(mut session: OrderSession, mut rx: mpsc::Receiver<Envelope>) -> OrderSession {
    while let Some(Envelope { command, reply }) = rx.recv().await {
        let name = command.name();
        debug!(command = name, "processing session command");
        let result = session.dispatch(command).await;
        if reply.send(result).is_err() {
            debug!(command = name, "caller went away before the reply");
        }
    }
    session
}

#[cfg(test)]
#[path = "tests/handle_tests.rs"]
mod tests;
