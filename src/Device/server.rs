//! Device daemon: serves slots to other processes over Unix sockets.
//!
//! Each configured device node is a socket path bound to one minor number.
//! Accepting a connection opens a session on that minor's slot, the
//! connection's requests drive the session, and hanging up closes it.

use std::io::{self, BufReader};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::Core::registry::SlotRegistry;
use crate::Core::transport::VecSink;
use crate::Device::error::{DeviceError, DeviceResult};
use crate::Device::wire::{read_request, write_response, Request};

/// How often idle accept loops check for shutdown.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A device file: socket path plus the minor number it exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceNode {
    pub path: PathBuf,
    pub minor: u32,
}

impl FromStr for DeviceNode {
    type Err = String;

    /// Parses `PATH=MINOR`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, minor) = s
            .rsplit_once('=')
            .ok_or_else(|| format!("expected PATH=MINOR, got {s:?}"))?;
        if path.is_empty() {
            return Err(format!("empty device path in {s:?}"));
        }
        let minor = minor
            .parse::<u32>()
            .map_err(|e| format!("invalid minor number {minor:?}: {e}"))?;
        Ok(Self {
            path: PathBuf::from(path),
            minor,
        })
    }
}

/// Serves a set of device nodes from one registry.
pub struct DeviceServer {
    registry: Arc<SlotRegistry>,
    nodes: Vec<DeviceNode>,
    shutdown: Arc<AtomicBool>,
}

impl DeviceServer {
    pub fn new(registry: Arc<SlotRegistry>, nodes: Vec<DeviceNode>, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            registry,
            nodes,
            shutdown,
        }
    }

    pub fn nodes(&self) -> &[DeviceNode] {
        &self.nodes
    }

    /// Binds every node, then serves until the shutdown flag is set.
    /// Socket files are removed before returning.
    pub fn run(&self) -> DeviceResult<()> {
        let mut listeners = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            match bind_node(node) {
                Ok(listener) => listeners.push((node.clone(), listener)),
                Err(e) => {
                    for (bound, _) in &listeners {
                        remove_socket(&bound.path);
                    }
                    return Err(e);
                }
            }
        }

        let connections = Arc::new(AtomicU64::new(0));
        let mut acceptors = Vec::with_capacity(listeners.len());
        for (node, listener) in listeners {
            let registry = Arc::clone(&self.registry);
            let shutdown = Arc::clone(&self.shutdown);
            let connections = Arc::clone(&connections);
            acceptors.push(thread::spawn(move || {
                accept_loop(&node, listener, registry, shutdown, connections);
                remove_socket(&node.path);
            }));
        }

        for acceptor in acceptors {
            if acceptor.join().is_err() {
                error!("accept thread panicked");
            }
        }
        info!(
            connections = connections.load(Ordering::Relaxed),
            "device server stopped"
        );
        Ok(())
    }
}

fn bind_node(node: &DeviceNode) -> DeviceResult<UnixListener> {
    let setup_err = |source: io::Error| DeviceError::SocketSetup {
        path: node.path.clone(),
        source,
    };

    if node.path.exists() {
        // Stale socket from a previous run.
        std::fs::remove_file(&node.path).map_err(setup_err)?;
    }
    let listener = UnixListener::bind(&node.path).map_err(setup_err)?;
    listener.set_nonblocking(true).map_err(setup_err)?;
    info!(path = %node.path.display(), minor = node.minor, "device listening");
    Ok(listener)
}

fn remove_socket(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "failed to remove socket");
        }
    }
}

fn accept_loop(
    node: &DeviceNode,
    listener: UnixListener,
    registry: Arc<SlotRegistry>,
    shutdown: Arc<AtomicBool>,
    connections: Arc<AtomicU64>,
) {
    while !shutdown.load(Ordering::Acquire) {
        match listener.accept() {
            Ok((stream, _)) => {
                let id = connections.fetch_add(1, Ordering::Relaxed);
                let registry = Arc::clone(&registry);
                let minor = node.minor;
                thread::spawn(move || {
                    debug!(connection = id, minor, "connection accepted");
                    if let Err(e) = handle_connection(&registry, minor, stream) {
                        warn!(connection = id, minor, error = %e, "connection ended with error");
                    } else {
                        debug!(connection = id, minor, "connection closed");
                    }
                });
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                error!(path = %node.path.display(), error = %e, "accept failed");
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
        }
    }
}

/// Runs one session for the lifetime of `stream`.
pub fn handle_connection(registry: &SlotRegistry, minor: u32, stream: UnixStream) -> DeviceResult<()> {
    stream.set_nonblocking(false)?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;

    let mut session = match registry.open(minor) {
        Ok(session) => {
            write_response(&mut writer, Ok((minor, &[][..])))?;
            session
        }
        Err(err) => {
            write_response(&mut writer, Err(err))?;
            return Ok(());
        }
    };

    while let Some(request) = read_request(&mut reader)? {
        match request {
            Request::SetChannel(channel_id) => {
                let outcome = session.select_channel(channel_id).map(|()| (0, &[][..]));
                write_response(&mut writer, outcome)?;
            }
            Request::Write(payload) => {
                let outcome = session
                    .write(payload.as_slice())
                    .map(|len| (len as u32, &[][..]));
                write_response(&mut writer, outcome)?;
            }
            Request::Read { capacity } => {
                let mut sink = VecSink::with_capacity(capacity as usize);
                match session.read(&mut sink) {
                    Ok(len) => {
                        let message = sink.into_inner();
                        write_response(&mut writer, Ok((len as u32, message.as_slice())))?;
                    }
                    Err(err) => write_response(&mut writer, Err(err))?,
                }
            }
        }
    }

    session.close();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_device_nodes() {
        let node: DeviceNode = "/tmp/slot0=3".parse().unwrap();
        assert_eq!(node.path, PathBuf::from("/tmp/slot0"));
        assert_eq!(node.minor, 3);

        let node: DeviceNode = "/tmp/odd=name=7".parse().unwrap();
        assert_eq!(node.path, PathBuf::from("/tmp/odd=name"));
        assert_eq!(node.minor, 7);

        assert!("/tmp/slot0".parse::<DeviceNode>().is_err());
        assert!("=1".parse::<DeviceNode>().is_err());
        assert!("/tmp/slot0=-1".parse::<DeviceNode>().is_err());
    }
}
