//! The task that owns the engine pipes.
//!
//! All protocol state lives here. The handle side only sees snapshots.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::process::Child;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, trace, warn};

use uci::{EngineMessage, GoOptions, GuiCommand};

use crate::{BestMove, SessionSnapshot, SessionState};

/// How long to wait for the engine process after `quit` before killing it.
const QUIT_GRACE: Duration = Duration::from_secs(2);

pub(crate) enum Request {
    SetPosition {
        fen: Option<String>,
        moves: Vec<String>,
        ack: oneshot::Sender<()>,
    },
    Go {
        depth: u32,
        multipv: u32,
        ack: oneshot::Sender<()>,
    },
    Stop {
        ack: oneshot::Sender<()>,
    },
    Quit {
        ack: oneshot::Sender<()>,
    },
}

pub(crate) struct Actor<R, W> {
    lines: Lines<BufReader<R>>,
    writer: W,
    process: Option<Child>,
    requests: mpsc::Receiver<Request>,
    snapshots: watch::Sender<SessionSnapshot>,
    snapshot: SessionSnapshot,
    /// Search queued behind a `stop` while the engine was busy.
    pending_go: Option<(u32, u32)>,
    /// MultiPV value the engine currently has set.
    multipv: u32,
}

impl<R, W> Actor<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub(crate) fn new(
        reader: R,
        writer: W,
        process: Option<Child>,
        requests: mpsc::Receiver<Request>,
        snapshots: watch::Sender<SessionSnapshot>,
    ) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            writer,
            process,
            requests,
            snapshots,
            snapshot: SessionSnapshot::default(),
            pending_go: None,
            multipv: 1,
        }
    }

    pub(crate) async fn run(mut self) {
        if self.send(&GuiCommand::Uci).await.is_ok() {
            loop {
                tokio::select! {
                    request = self.requests.recv() => match request {
                        Some(request) => {
                            if let ControlFlow::Break(()) = self.on_request(request).await {
                                break;
                            }
                        }
                        // All handles dropped; nothing left to serve.
                        None => break,
                    },
                    line = self.lines.next_line() => match line {
                        Ok(Some(line)) => self.on_line(line.trim()).await,
                        Ok(None) => {
                            self.fail("engine closed its output stream");
                            break;
                        }
                        Err(err) => {
                            self.fail(&format!("engine read failed: {err}"));
                            break;
                        }
                    },
                }
                if self.snapshot.state == SessionState::Terminated {
                    break;
                }
            }
        }
        self.shutdown().await;
    }

    async fn on_request(&mut self, request: Request) -> ControlFlow<()> {
        match request {
            Request::SetPosition { fen, moves, ack } => {
                let _ = self.send(&GuiCommand::Position { fen, moves }).await;
                let _ = ack.send(());
            }
            Request::Go { depth, multipv, ack } => {
                if self.snapshot.state == SessionState::Busy {
                    // Stop first; the queued search starts once the stale
                    // bestmove comes back.
                    let _ = self.send(&GuiCommand::Stop).await;
                    self.pending_go = Some((depth, multipv));
                } else {
                    let _ = self.start_search(depth, multipv).await;
                }
                let _ = ack.send(());
            }
            Request::Stop { ack } => {
                if self.snapshot.state == SessionState::Busy {
                    let _ = self.send(&GuiCommand::Stop).await;
                }
                self.pending_go = None;
                let _ = ack.send(());
            }
            Request::Quit { ack } => {
                let _ = self.send(&GuiCommand::Quit).await;
                self.snapshot.state = SessionState::Terminated;
                self.publish();
                let _ = ack.send(());
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    async fn on_line(&mut self, line: &str) {
        let Some(message) = EngineMessage::parse(line) else {
            trace!(line, "engine line ignored");
            return;
        };
        trace!(line, "engine >");

        match message {
            EngineMessage::UciOk => {
                let _ = self.send(&GuiCommand::IsReady).await;
            }
            EngineMessage::ReadyOk => {
                if self.snapshot.state == SessionState::Initializing {
                    self.snapshot.state = SessionState::Ready;
                    self.publish();
                }
            }
            EngineMessage::Info(info) => {
                if self.snapshot.state != SessionState::Busy {
                    return;
                }
                let line_index = info.multipv.unwrap_or(1).max(1) as usize - 1;
                if self.snapshot.lines.len() <= line_index {
                    self.snapshot
                        .lines
                        .resize(line_index + 1, Default::default());
                }
                self.snapshot.lines[line_index] = info.clone();

                // Only the primary line advances last_info, and never to a
                // shallower depth than already reported.
                let regressed = matches!(
                    (&self.snapshot.last_info, info.depth),
                    (Some(prev), Some(depth)) if prev.depth.is_some_and(|p| depth < p)
                );
                if line_index == 0 && !regressed {
                    self.snapshot.last_info = Some(info);
                    self.publish();
                }
            }
            EngineMessage::BestMove { mv, ponder } => {
                if let Some((depth, multipv)) = self.pending_go.take() {
                    // This bestmove belongs to the search we stopped.
                    let _ = self.start_search(depth, multipv).await;
                    return;
                }
                self.snapshot.best_move = Some(BestMove { mv, ponder });
                self.snapshot.state = SessionState::Ready;
                self.publish();
            }
        }
    }

    async fn start_search(&mut self, depth: u32, multipv: u32) -> Result<(), ()> {
        if multipv != self.multipv {
            self.send(&GuiCommand::multipv(multipv)).await?;
            self.multipv = multipv;
        }
        self.snapshot.last_info = None;
        self.snapshot.best_move = None;
        self.snapshot.lines.clear();
        self.send(&GuiCommand::Go(GoOptions::depth(depth))).await?;
        self.snapshot.state = SessionState::Busy;
        self.snapshot.searches_started += 1;
        self.publish();
        Ok(())
    }

    async fn send(&mut self, command: &GuiCommand) -> Result<(), ()> {
        let wire = command.to_uci();
        debug!(command = %wire, "engine <");
        let mut buf = wire.into_bytes();
        buf.push(b'\n');
        let result = self.write_all(&buf).await;
        if let Err(err) = result {
            self.fail(&format!("engine write failed: {err}"));
            return Err(());
        }
        Ok(())
    }

    async fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.writer.write_all(buf).await?;
        self.writer.flush().await
    }

    fn fail(&mut self, reason: &str) {
        warn!(reason, "engine session failed");
        self.snapshot.state = SessionState::Terminated;
        self.snapshot.error = Some(reason.to_string());
        self.publish();
    }

    fn publish(&self) {
        let _ = self.snapshots.send(self.snapshot.clone());
    }

    async fn shutdown(mut self) {
        if let Some(mut process) = self.process.take() {
            match tokio::time::timeout(QUIT_GRACE, process.wait()).await {
                Ok(Ok(status)) => debug!(%status, "engine exited"),
                Ok(Err(err)) => warn!(%err, "waiting on engine process failed"),
                Err(_) => {
                    warn!("engine did not exit in time, killing it");
                    let _ = process.start_kill();
                }
            }
        }
    }
}
