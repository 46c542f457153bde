//! Remote session host over SSH.
//!
//! Every accepted connection runs the SSH protocol on its own task. A
//! driver task per connection owns that connection's `SessionState` and
//! handles its events strictly one after another; the document tree is the
//! only thing sessions share, read-only behind an `Arc`.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use docview_engine::{Command, ContentPipeline, LayoutConfig, SessionState, Theme};
use docview_types::{DocumentNode, SessionEvent};
use russh::keys::PrivateKey;
use russh::server::{self, Auth, Msg, Session};
use russh::{Channel, ChannelId, CryptoVec, Disconnect, Pty};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::config::AppConfig;
use crate::frame::{self, Frame};
use crate::host_key::load_or_create_host_key;
use crate::input::InputDecoder;
use crate::read::read_bounded;
use crate::{Error, Result};

/// Sent ahead of the SSH identification line when the server is full.
const REFUSAL: &[u8] = b"docview: too many sessions, try again later\r\n";
const NO_TERMINAL: &[u8] = b"docview: a terminal is required (try ssh -t)\r\n";

/// Per-connection limits and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSettings {
    pub default_width: u16,
    pub default_height: u16,
    pub read_timeout: Duration,
    pub shutdown_grace: Duration,
    pub max_sessions: usize,
}

impl HostSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            default_width: config.server.default_width,
            default_height: config.server.default_height,
            read_timeout: config.read_timeout(),
            shutdown_grace: config.shutdown_grace(),
            max_sessions: config.server.max_sessions,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct DocServer {
    tree: Arc<DocumentNode>,
    theme: Theme,
    layout: LayoutConfig,
    pipeline: ContentPipeline,
    settings: HostSettings,
    ssh: Arc<server::Config>,
}

impl DocServer {
    pub fn new(
        tree: Arc<DocumentNode>,
        theme: Theme,
        layout: LayoutConfig,
        pipeline: ContentPipeline,
        settings: HostSettings,
        host_key: PrivateKey,
    ) -> Self {
        let ssh = server::Config {
            keys: vec![host_key],
            auth_rejection_time: Duration::from_secs(1),
            auth_rejection_time_initial: Some(Duration::ZERO),
            inactivity_timeout: None,
            keepalive_interval: Some(Duration::from_secs(30)),
            nodelay: true,
            ..Default::default()
        };
        Self {
            tree,
            theme,
            layout,
            pipeline,
            settings,
            ssh: Arc::new(ssh),
        }
    }

    /// Build a server from a validated configuration, creating the host key
    /// on first use.
    pub fn from_config(tree: Arc<DocumentNode>, config: &AppConfig) -> Result<Self> {
        let theme = config.theme()?;
        let pipeline = ContentPipeline::new(theme.clone()).with_max_bytes(config.documents.max_bytes);
        let host_key = load_or_create_host_key(&config.host_key_path()?)?;
        Ok(Self::new(
            tree,
            theme,
            config.layout(),
            pipeline,
            HostSettings::from_config(config),
            host_key,
        ))
    }

    pub async fn bind(addr: &str) -> Result<TcpListener> {
        TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Transport(format!("failed to bind to {}: {}", addr, e)))
    }

    /// Accept connections until `shutdown` resolves, then ask every session
    /// to close and wait up to the grace period before aborting the rest.
    pub async fn serve<F>(self: Arc<Self>, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let local = listener.local_addr()?;
        info!(addr = %local, documents = self.tree.document_count(), "listening");

        let (stop_tx, stop_rx) = watch::channel(false);
        let mut sessions = JoinSet::new();
        let mut next_id = 0u64;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(err) => {
                            warn!(error = %err, "accept failed");
                            continue;
                        }
                    };
                    while sessions.try_join_next().is_some() {}
                    if sessions.len() >= self.settings.max_sessions {
                        warn!(%peer, active = sessions.len(), "refusing connection");
                        refuse(stream).await;
                        continue;
                    }

                    next_id += 1;
                    let server = Arc::clone(&self);
                    let stop = stop_rx.clone();
                    sessions.spawn(server.run_session(next_id, stream, peer, stop));
                }
            }
        }

        info!(active = sessions.len(), "shutting down");
        let _ = stop_tx.send(true);

        let grace = self.settings.shutdown_grace;
        let drained = tokio::time::timeout(grace, async {
            while sessions.join_next().await.is_some() {}
        })
        .await
        .is_ok();
        if !drained {
            warn!(remaining = sessions.len(), "grace period elapsed, aborting sessions");
            sessions.abort_all();
        }

        info!("server stopped");
        Ok(())
    }

    async fn run_session(
        self: Arc<Self>,
        id: u64,
        stream: TcpStream,
        peer: SocketAddr,
        stop: watch::Receiver<bool>,
    ) {
        let span = info_span!("session", id, %peer);
        async move {
            let started = Instant::now();
            info!("connection opened");
            match self.drive(stream, stop).await {
                Ok(()) => info!(duration_ms = started.elapsed().as_millis() as u64, "session closed"),
                Err(err) => warn!(
                    duration_ms = started.elapsed().as_millis() as u64,
                    error = %err,
                    "session ended with error"
                ),
            }
        }
        .instrument(span)
        .await
    }

    async fn drive(&self, stream: TcpStream, mut stop: watch::Receiver<bool>) -> Result<()> {
        let (tx, mut inbound) = mpsc::channel(64);
        let handler = ChannelHandler::new(
            tx,
            (self.settings.default_width, self.settings.default_height),
        );
        let running = tokio::select! {
            _ = stop.changed() => return Ok(()),
            running = server::run_stream(Arc::clone(&self.ssh), stream, handler) => running?,
        };
        let handle = running.handle();

        let (channel, width, height) = loop {
            tokio::select! {
                _ = stop.changed() => {
                    disconnect(&handle, "server shutting down").await;
                    return Ok(());
                }
                event = inbound.recv() => match event {
                    Some(Inbound::Shell { channel, width, height }) => break (channel, width, height),
                    Some(Inbound::Closed) => {
                        disconnect(&handle, "session closed").await;
                        return Ok(());
                    }
                    Some(_) => {}
                    None => return Ok(()),
                },
            }
        };
        info!(width, height, "terminal session started");

        let output = Output {
            handle: handle.clone(),
            channel,
        };
        output.send(frame::enter_screen()?).await?;

        let mut state = SessionState::new(Arc::clone(&self.tree), self.layout);
        let mut decoder = InputDecoder::new();
        let (next, mut flow) = self
            .handle_event(state, SessionEvent::Resize { width, height }, &output)
            .await?;
        state = next;

        while flow == Flow::Continue {
            tokio::select! {
                _ = stop.changed() => break,
                event = inbound.recv() => match event {
                    Some(Inbound::Data(bytes)) => {
                        for event in decoder.feed(&bytes) {
                            let (next, next_flow) = self.handle_event(state, event, &output).await?;
                            state = next;
                            flow = next_flow;
                            if flow == Flow::Quit {
                                break;
                            }
                        }
                    }
                    Some(Inbound::Resize { width, height }) => {
                        let event = SessionEvent::Resize { width, height };
                        let (next, next_flow) = self.handle_event(state, event, &output).await?;
                        state = next;
                        flow = next_flow;
                    }
                    Some(Inbound::Shell { .. }) => {}
                    Some(Inbound::Closed) | None => {
                        debug!("client closed the channel");
                        disconnect(&handle, "session closed").await;
                        return Ok(());
                    }
                },
            }
        }

        output.send(frame::leave_screen()?).await?;
        let _ = handle.exit_status_request(channel, 0).await;
        let _ = handle.eof(channel).await;
        let _ = handle.close(channel).await;
        disconnect(&handle, "session ended").await;
        if let Err(err) = running.await {
            debug!(error = %err, "ssh session ended with error");
        }
        Ok(())
    }

    async fn handle_event(
        &self,
        state: SessionState,
        event: SessionEvent,
        output: &Output,
    ) -> Result<(SessionState, Flow)> {
        let resized = matches!(event, SessionEvent::Resize { .. });
        let (mut state, command) = state.update(&event);

        match command {
            Command::Quit => return Ok((state, Flow::Quit)),
            Command::None => return Ok((state, Flow::Continue)),
            Command::Render => {}
            Command::Reload { reset_scroll } => self.reload(&mut state, reset_scroll).await,
        }

        let frame = Frame::render(&state, &self.theme);
        output.send(frame.to_ansi(resized)?).await?;
        Ok((state, Flow::Continue))
    }

    async fn reload(&self, state: &mut SessionState, reset_scroll: bool) {
        let wrap = state.wrap_width();
        let content = match state.selected_path() {
            None => self.pipeline.no_selection(),
            Some(path) => {
                let bytes = read_bounded(
                    path.to_path_buf(),
                    self.pipeline.max_bytes(),
                    self.settings.read_timeout,
                )
                .await;
                self.pipeline.render_loaded(path, bytes, wrap)
            }
        };
        state.apply_content(content, reset_scroll);
    }
}

/// What the protocol task hands to the session driver.
#[derive(Debug)]
enum Inbound {
    Shell {
        channel: ChannelId,
        width: u16,
        height: u16,
    },
    Resize {
        width: u16,
        height: u16,
    },
    Data(Vec<u8>),
    Closed,
}

/// Protocol callbacks for one connection. Only the first session channel
/// is served, and only once it has a PTY.
struct ChannelHandler {
    inbound: mpsc::Sender<Inbound>,
    default_size: (u16, u16),
    channel: Option<ChannelId>,
    pty: Option<(u16, u16)>,
}

impl ChannelHandler {
    fn new(inbound: mpsc::Sender<Inbound>, default_size: (u16, u16)) -> Self {
        Self {
            inbound,
            default_size,
            channel: None,
            pty: None,
        }
    }

    fn owns(&self, channel: ChannelId) -> bool {
        self.channel == Some(channel)
    }

    /// Terminal size from a client report; zero means "unknown".
    fn size(&self, cols: u32, rows: u32) -> (u16, u16) {
        let (default_width, default_height) = self.default_size;
        let clamp = |value: u32, default: u16| match value {
            0 => default,
            v => u16::try_from(v).unwrap_or(u16::MAX),
        };
        (clamp(cols, default_width), clamp(rows, default_height))
    }

    async fn forward(&self, event: Inbound) {
        if self.inbound.send(event).await.is_err() {
            debug!("session driver is gone");
        }
    }

    async fn start(&mut self, channel: ChannelId, session: &mut Session) -> Result<()> {
        if !self.owns(channel) {
            session.channel_failure(channel)?;
            return Ok(());
        }

        session.channel_success(channel)?;
        match self.pty {
            Some((width, height)) => {
                self.forward(Inbound::Shell {
                    channel,
                    width,
                    height,
                })
                .await;
            }
            None => {
                warn!("refusing session without a terminal");
                session.data(channel, CryptoVec::from(NO_TERMINAL))?;
                session.exit_status_request(channel, 1)?;
                session.eof(channel)?;
                session.close(channel)?;
                self.forward(Inbound::Closed).await;
            }
        }
        Ok(())
    }
}

impl server::Handler for ChannelHandler {
    type Error = Error;

    async fn auth_none(&mut self, user: &str) -> Result<Auth> {
        debug!(user, "accepting client");
        Ok(Auth::Accept)
    }

    async fn channel_open_session(
        &mut self,
        channel: Channel<Msg>,
        _session: &mut Session,
    ) -> Result<bool> {
        if self.channel.is_some() {
            debug!("rejecting additional session channel");
            return Ok(false);
        }
        self.channel = Some(channel.id());
        Ok(true)
    }

    async fn pty_request(
        &mut self,
        channel: ChannelId,
        term: &str,
        col_width: u32,
        row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        _modes: &[(Pty, u32)],
        session: &mut Session,
    ) -> Result<()> {
        if !self.owns(channel) {
            session.channel_failure(channel)?;
            return Ok(());
        }
        debug!(term, col_width, row_height, "pty requested");
        self.pty = Some(self.size(col_width, row_height));
        session.channel_success(channel)?;
        Ok(())
    }

    async fn shell_request(&mut self, channel: ChannelId, session: &mut Session) -> Result<()> {
        self.start(channel, session).await
    }

    async fn exec_request(
        &mut self,
        channel: ChannelId,
        data: &[u8],
        session: &mut Session,
    ) -> Result<()> {
        debug!(command = %String::from_utf8_lossy(data), "treating exec as shell");
        self.start(channel, session).await
    }

    async fn window_change_request(
        &mut self,
        channel: ChannelId,
        col_width: u32,
        row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        _session: &mut Session,
    ) -> Result<()> {
        if self.owns(channel) && self.pty.is_some() {
            let (width, height) = self.size(col_width, row_height);
            self.forward(Inbound::Resize { width, height }).await;
        }
        Ok(())
    }

    async fn data(&mut self, channel: ChannelId, data: &[u8], _session: &mut Session) -> Result<()> {
        if self.owns(channel) {
            self.forward(Inbound::Data(data.to_vec())).await;
        }
        Ok(())
    }

    async fn channel_close(&mut self, channel: ChannelId, _session: &mut Session) -> Result<()> {
        if self.owns(channel) {
            self.forward(Inbound::Closed).await;
        }
        Ok(())
    }
}

/// The session channel frames are written to.
struct Output {
    handle: server::Handle,
    channel: ChannelId,
}

impl Output {
    async fn send(&self, bytes: Vec<u8>) -> Result<()> {
        self.handle
            .data(self.channel, CryptoVec::from(bytes))
            .await
            .map_err(|_| Error::Transport("connection closed while sending".to_string()))
    }
}

async fn disconnect(handle: &server::Handle, reason: &str) {
    if let Err(err) = handle
        .disconnect(Disconnect::ByApplication, reason.to_string(), String::new())
        .await
    {
        debug!(error = %err, "disconnect not delivered");
    }
}

async fn refuse(mut stream: TcpStream) {
    if let Err(err) = stream.write_all(REFUSAL).await {
        debug!(error = %err, "failed to send refusal");
    }
    let _ = stream.shutdown().await;
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C"),
        _ = terminate => info!("received SIGTERM"),
    }
}
