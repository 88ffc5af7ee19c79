//! Session actor
//!
//! Runs a [`Coordinator`] on its own tokio task. Commands arrive over an mpsc
//! channel and are applied in order; every engine call runs as a separate
//! task and reports back through a completion channel, where the coordinator
//! keeps the latest cycle and discards the rest. Each processed command or
//! completion publishes a fresh [`ValidationState`] on a watch channel.
//!
//! The actor stops when every [`SessionHandle`] has been dropped or
//! [`SessionHandle::shutdown`] is called. In-flight engine calls are left to
//! finish; their results go nowhere.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use valstate_core_types::SessionId;

use crate::apply::apply;
use crate::commands::Command;
use crate::coordinator::{CompletedCycle, Coordinator, PendingCycle, ValidationState};
use crate::errors::{CoordinatorError, Result};
use crate::model::{AttributeSnapshot, SchemaSelector, ValidationErrors};
use crate::{log_op_end, log_op_start};

#[derive(Debug, Clone)]
struct Published {
    /// Commands processed so far
    revision: u64,
    state: ValidationState,
}

/// Caller-side handle to a running session
pub struct SessionHandle {
    session_id: SessionId,
    commands: mpsc::UnboundedSender<Command>,
    published: watch::Receiver<Published>,
    sent: AtomicU64,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Spawn the actor and start the initial validation cycle
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(coordinator: Coordinator) -> Self {
        let session_id = SessionId::new();
        let (commands, inbox) = mpsc::unbounded_channel();
        let (publisher, published) = watch::channel(Published {
            revision: 0,
            state: coordinator.state(),
        });

        let task = tokio::spawn(run(coordinator, inbox, publisher, session_id.clone()));

        Self {
            session_id,
            commands,
            published,
            sent: AtomicU64::new(0),
            task,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Queue a command for the actor
    ///
    /// # Errors
    ///
    /// Returns `CoordinatorError::SessionClosed` if the actor has stopped.
    pub fn send(&self, cmd: Command) -> Result<()> {
        self.commands
            .send(cmd)
            .map_err(|_| CoordinatorError::SessionClosed)?;
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CoordinatorError::SessionClosed` if the actor has stopped.
    pub fn set_attributes(&self, attributes: AttributeSnapshot) -> Result<()> {
        self.send(Command::SetAttributes { attributes })
    }

    /// # Errors
    ///
    /// Returns `CoordinatorError::SessionClosed` if the actor has stopped.
    pub fn set_known_errors(&self, errors: ValidationErrors) -> Result<()> {
        self.send(Command::SetKnownErrors { errors })
    }

    /// # Errors
    ///
    /// Returns `CoordinatorError::SessionClosed` if the actor has stopped.
    pub fn set_show_errors(&self, show: bool) -> Result<()> {
        self.send(Command::SetShowErrors { show })
    }

    /// # Errors
    ///
    /// Returns `CoordinatorError::SessionClosed` if the actor has stopped.
    pub fn set_schema(&self, schema: Option<SchemaSelector>) -> Result<()> {
        self.send(Command::SetSchema { schema })
    }

    /// # Errors
    ///
    /// Returns `CoordinatorError::SessionClosed` if the actor has stopped.
    pub fn reset(&self, attributes: AttributeSnapshot) -> Result<()> {
        self.send(Command::Reset { attributes })
    }

    /// Latest published state, without waiting
    pub fn state(&self) -> ValidationState {
        self.published.borrow().state.clone()
    }

    /// A receiver notified on every publication
    pub fn subscribe(&self) -> watch::Receiver<ValidationState> {
        let mut source = self.published.clone();
        let (tx, rx) = watch::channel(source.borrow_and_update().state.clone());
        tokio::spawn(async move {
            while source.changed().await.is_ok() {
                let state = source.borrow_and_update().state.clone();
                if tx.send(state).is_err() {
                    break;
                }
            }
        });
        rx
    }

    /// Wait until every command sent so far has been processed and the
    /// latest cycle has been applied
    ///
    /// # Errors
    ///
    /// Returns `CoordinatorError::SessionClosed` if the actor stops first.
    pub async fn settled(&self) -> Result<ValidationState> {
        let target = self.sent.load(Ordering::SeqCst);
        let mut published = self.published.clone();
        let current = published
            .wait_for(|p| p.revision >= target && p.state.settled)
            .await
            .map_err(|_| CoordinatorError::SessionClosed)?;
        Ok(current.state.clone())
    }

    /// Stop the actor and wait for it to finish
    pub async fn shutdown(self) {
        let SessionHandle { commands, task, .. } = self;
        drop(commands);
        task.await.ok();
    }
}

fn spawn_cycle(pending: PendingCycle, done: &mpsc::UnboundedSender<CompletedCycle>) {
    let done = done.clone();
    tokio::spawn(async move {
        let completed = pending.resolve().await;
        done.send(completed).ok();
    });
}

async fn run(
    mut coordinator: Coordinator,
    mut inbox: mpsc::UnboundedReceiver<Command>,
    publisher: watch::Sender<Published>,
    session_id: SessionId,
) {
    let started = Instant::now();
    log_op_start!("session", session_id = %session_id);

    let (done, mut completions) = mpsc::unbounded_channel();
    let mut revision = 0u64;

    spawn_cycle(coordinator.revalidate(), &done);
    publisher.send_replace(Published {
        revision,
        state: coordinator.state(),
    });

    loop {
        tokio::select! {
            cmd = inbox.recv() => {
                let Some(cmd) = cmd else { break };
                revision += 1;
                tracing::debug!(
                    component = module_path!(),
                    session_id = %session_id,
                    op = cmd.op(),
                    revision,
                );
                if let Some(pending) = apply(&mut coordinator, cmd) {
                    spawn_cycle(pending, &done);
                }
            }
            Some(completed) = completions.recv() => {
                coordinator.complete_cycle(completed);
            }
        }

        publisher.send_replace(Published {
            revision,
            state: coordinator.state(),
        });
    }

    log_op_end!(
        "session",
        duration_ms = started.elapsed().as_millis() as u64,
        session_id = %session_id,
        revision
    );
}
