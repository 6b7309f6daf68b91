//! Lifecycle management for a single UCI engine.
//!
//! An [`EngineSession`] owns a dedicated task that talks to one engine over
//! its stdin/stdout pipes. Callers send commands through the session handle
//! and observe the engine through a [`SessionSnapshot`] watch channel: the
//! latest search info, the best move once a search completes, and the
//! session state.
//!
//! # Lifecycle
//!
//! 1. Spawn the engine with [`EngineSession::spawn`] (or wire up any
//!    async reader/writer pair with [`EngineSession::attach`])
//! 2. Wait for the UCI handshake with [`EngineSession::ready`]
//! 3. Drive searches with [`set_position`](EngineSession::set_position),
//!    [`go`](EngineSession::go) and [`stop`](EngineSession::stop)
//! 4. Shut down with [`quit`](EngineSession::quit)
//!
//! Once the session reaches [`SessionState::Terminated`] it stays there;
//! every later command fails with [`SessionError::Closed`].

mod actor;

use std::path::Path;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::Child;
use tokio::sync::{mpsc, oneshot, watch};

use actor::{Actor, Request};
use uci::EngineInfo;

/// Errors surfaced by an engine session.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The engine process could not be spawned.
    #[error("failed to spawn engine: {0}")]
    Spawn(#[source] std::io::Error),
    /// The engine died or misbehaved before completing the UCI handshake.
    #[error("engine initialization failed: {0}")]
    Init(String),
    /// The session has terminated and no longer accepts commands.
    #[error("engine session terminated")]
    Closed,
}

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// UCI handshake in progress.
    Initializing,
    /// Idle, ready for a search.
    Ready,
    /// A search is running.
    Busy,
    /// Engine gone. Absorbing: no transition leads out of here.
    Terminated,
}

impl SessionState {
    pub fn is_live(&self) -> bool {
        !matches!(self, SessionState::Terminated)
    }
}

/// Result of a completed search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestMove {
    pub mv: String,
    pub ponder: Option<String>,
}

/// Point-in-time view of the session, published on every change.
///
/// `last_info` and `best_move` always describe the most recently started
/// search: starting a new search clears both, so an observer never sees
/// results left over from a previous position.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    /// Latest primary-line info report of the current search.
    pub last_info: Option<EngineInfo>,
    /// Per-line info reports when MultiPV > 1, indexed by line.
    pub lines: Vec<EngineInfo>,
    /// Set once the current search has completed.
    pub best_move: Option<BestMove>,
    /// Populated when the session terminates abnormally.
    pub error: Option<String>,
    /// Number of `go` commands actually written to the engine.
    pub searches_started: u64,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            state: SessionState::Initializing,
            last_info: None,
            lines: Vec::new(),
            best_move: None,
            error: None,
            searches_started: 0,
        }
    }
}

impl SessionSnapshot {
    pub fn is_busy(&self) -> bool {
        self.state == SessionState::Busy
    }
}

/// Handle to a running engine session.
///
/// Cloning the handle is cheap; all clones talk to the same engine task.
#[derive(Clone)]
pub struct EngineSession {
    requests: mpsc::Sender<Request>,
    snapshots: watch::Receiver<SessionSnapshot>,
    batch: Arc<AtomicBool>,
}

impl EngineSession {
    /// Spawn a UCI engine process and start driving it.
    ///
    /// The process is killed if the session task is dropped without a
    /// graceful [`quit`](Self::quit).
    pub fn spawn<P: AsRef<Path>>(path: P) -> Result<Self, SessionError> {
        let mut process = tokio::process::Command::new(path.as_ref())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(SessionError::Spawn)?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| SessionError::Init("engine stdin not captured".to_string()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| SessionError::Init("engine stdout not captured".to_string()))?;

        Ok(Self::start(stdout, stdin, Some(process)))
    }

    /// Drive an engine over an arbitrary reader/writer pair.
    ///
    /// Used to talk to engines that are not child processes (and to
    /// scripted engines in tests).
    pub fn attach<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        Self::start(reader, writer, None)
    }

    fn start<R, W>(reader: R, writer: W, process: Option<Child>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (requests, request_rx) = mpsc::channel(32);
        let (snapshot_tx, snapshots) = watch::channel(SessionSnapshot::default());
        tokio::spawn(Actor::new(reader, writer, process, request_rx, snapshot_tx).run());
        Self {
            requests,
            snapshots,
            batch: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Wait until the UCI handshake has completed.
    ///
    /// Returns [`SessionError::Init`] if the engine terminates before
    /// reaching the ready state.
    pub async fn ready(&self) -> Result<(), SessionError> {
        let mut rx = self.snapshots.clone();
        loop {
            {
                let snap = rx.borrow_and_update();
                match snap.state {
                    SessionState::Ready | SessionState::Busy => return Ok(()),
                    SessionState::Terminated => {
                        let reason = snap
                            .error
                            .clone()
                            .unwrap_or_else(|| "engine terminated during startup".to_string());
                        return Err(SessionError::Init(reason));
                    }
                    SessionState::Initializing => {}
                }
            }
            rx.changed().await.map_err(|_| SessionError::Closed)?;
        }
    }

    /// Send the position to analyze. `fen: None` means the start position.
    pub async fn set_position(
        &self,
        fen: Option<String>,
        moves: Vec<String>,
    ) -> Result<(), SessionError> {
        self.request(|ack| Request::SetPosition { fen, moves, ack })
            .await
    }

    /// Start a depth-limited search.
    ///
    /// If a search is already running, the session stops it first and
    /// starts the new one as soon as the engine acknowledges. The stale
    /// search's result is discarded.
    pub async fn go(&self, depth: u32, multipv: u32) -> Result<(), SessionError> {
        self.request(|ack| Request::Go { depth, multipv, ack }).await
    }

    /// Ask the engine to wrap up the current search.
    ///
    /// The engine answers with its best move so far, which completes the
    /// search like a natural finish.
    pub async fn stop(&self) -> Result<(), SessionError> {
        self.request(|ack| Request::Stop { ack }).await
    }

    /// Shut the engine down gracefully.
    pub async fn quit(&self) -> Result<(), SessionError> {
        self.request(|ack| Request::Quit { ack }).await
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Subscribe to snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Mark the session as part of a batch run until the guard drops.
    ///
    /// Observers use this to tell a scheduler-driven search apart from an
    /// interactive one.
    pub fn begin_batch(&self) -> BatchGuard {
        self.batch.store(true, Ordering::SeqCst);
        BatchGuard {
            flag: Arc::clone(&self.batch),
        }
    }

    pub fn in_batch(&self) -> bool {
        self.batch.load(Ordering::SeqCst)
    }

    async fn request(
        &self,
        build: impl FnOnce(oneshot::Sender<()>) -> Request,
    ) -> Result<(), SessionError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.requests
            .send(build(ack_tx))
            .await
            .map_err(|_| SessionError::Closed)?;
        ack_rx.await.map_err(|_| SessionError::Closed)
    }
}

/// Clears the batch flag when dropped.
pub struct BatchGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for BatchGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
