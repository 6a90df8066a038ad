//! Subject bootstrap.
//!
//! Newly connecting principals walk a short labeling sequence; every step
//! is best-effort and non-fatal, retaining the prior state when nothing
//! can be discovered. The server's own pseudo-principal is bootstrapped
//! separately at monitor-initialization time.
//!
//! Transport-level reads use nix where it has a wrapper (`SO_PEERCRED`)
//! and raw libc where it does not (`SO_PEERSEC`, `fstat`, `fsetxattr`).

use super::{ResourceAccess, ResourceHandle, ScreenAccess, SmackMonitor};
use crate::config::types::{AccessFlags, Result};
use crate::label::{
    SmackLabel, SMACK_DEFAULTED, SMACK_FLOOR, SMACK_SIZE, SMACK_STAR, SMACK_WEB,
};
use crate::observability::audit::{AuditEvent, AuditEventKind};
use crate::store::{ClientId, DeviceId, ResourceId, ScreenId};
use log::{debug, info, warn};
use nix::sys::socket::sockopt::PeerCredentials;
use nix::sys::socket::{getsockopt, UnixCredentials};
use std::ffi::CString;
use std::os::fd::{BorrowedFd, RawFd};
use std::path::Path;

/// Extended attribute carrying a socket's inbound-traffic label.
const XATTR_IPIN: &str = "security.SMACK64IPIN";
/// Extended attribute carrying a socket's outbound-traffic label.
const XATTR_IPOUT: &str = "security.SMACK64IPOUT";

/// Per-screen bootstrap input: the screen itself and, when the host has
/// one, its default colormap resource, both of which predate the monitor
/// and need create-mode labeling.
#[derive(Debug, Clone, Copy)]
pub struct ScreenBootstrap {
    pub screen: ScreenId,
    pub default_colormap: Option<ResourceId>,
}

impl SmackMonitor {
    /// Label a newly connected client.
    ///
    /// `fd` is the connection socket, which must stay open for the
    /// duration of the call; `local` enables best-effort command-name
    /// resolution for same-host peers.
    pub fn client_connected(&mut self, client: ClientId, fd: RawFd, local: bool) {
        let (label, privileged, command) = {
            let slot = self.store.client(client);

            // What to use where nothing can be discovered.
            slot.subject.smack.assign(SMACK_DEFAULTED);
            slot.object.smack.assign(SMACK_DEFAULTED);

            if let Some(peer) = peer_label(fd) {
                slot.subject.smack.assign(&peer);
            }

            let mut peer_pid = None;
            if let Some(cred) = peer_credentials(fd) {
                if cred.uid() == 0 {
                    slot.subject.privileged = true;
                }
                peer_pid = Some(cred.pid());
            }

            if local {
                if let Some(command) = peer_pid.and_then(resolve_command) {
                    slot.subject.set_command(&command);
                }
            }

            let derived = crate::label::object_from_subject(&slot.subject.smack);
            slot.object.smack.assign(derived.as_str());

            (
                slot.subject.smack.clone(),
                slot.subject.privileged,
                slot.subject.command.clone(),
            )
        };

        debug!(
            "labeled client {:?} as \"{}\"{} ({})",
            client,
            label,
            if privileged { " privileged" } else { "" },
            if command.is_empty() { "-" } else { command.as_str() }
        );
        self.audit.record(
            AuditEvent::new(
                AuditEventKind::SubjectLabeled,
                format!("client {} labeled", client.0),
            )
            .with_subject(label.as_str()),
        );
    }

    /// Destroy a client's subject state at connection teardown.
    pub fn client_disconnected(&mut self, client: ClientId) {
        self.store.remove_client(client);
    }

    /// Destroy a device's subject state at device removal.
    pub fn device_removed(&mut self, device: DeviceId) {
        self.store.remove_device(device);
    }

    /// Bootstrap the server's own pseudo-principal and label the objects
    /// that were created before the monitor could mediate.
    pub fn bootstrap_server(&mut self, screens: &[ScreenBootstrap]) -> Result<()> {
        let server_label = fetch_process_label(&self.config.self_label_path);

        self.relabel_inherited_sockets();

        {
            let slot = self.store.client(ClientId::SERVER);
            slot.subject.privileged = true;
            let command = self.config.server_command.clone();
            slot.subject.set_command(&command);
            slot.subject.smack.assign(server_label.as_str());
            slot.object.smack.assign(server_label.as_str());
        }
        info!("server subject labeled \"{}\"", server_label);

        for entry in screens {
            let status = self.mediate_screen(&ScreenAccess {
                client: ClientId::SERVER,
                screen: entry.screen,
                access: AccessFlags::CREATE,
                saver: false,
            });
            if !status.success() {
                warn!("screen {:?} bootstrap labeling failed", entry.screen);
            }

            if let Some(colormap) = entry.default_colormap {
                let verdict = self.mediate_resource(&ResourceAccess {
                    client: ClientId::SERVER,
                    owner: ClientId::SERVER,
                    target: ResourceHandle::Resource(colormap),
                    parent: None,
                    access: AccessFlags::CREATE,
                });
                if !verdict.status.success() {
                    warn!("default colormap {:?} bootstrap labeling failed", colormap);
                }
            }
        }

        self.audit.record(
            AuditEvent::new(
                AuditEventKind::ServerBootstrapped,
                format!("{} screens labeled", screens.len()),
            )
            .with_subject(server_label.as_str()),
        );
        Ok(())
    }

    /// Relabel any socket descriptor inherited from before monitor
    /// initialization: inbound wildcard-all, outbound web, so pre-existing
    /// connections are treated consistently once mediation begins.
    fn relabel_inherited_sockets(&self) {
        for fd in 0..self.config.relabel_fd_ceiling {
            // SAFETY: fstat only writes the passed stat buffer; a stale or
            // unused descriptor number yields EBADF, which is skipped.
            let mut stat: libc::stat = unsafe { std::mem::zeroed() };
            if unsafe { libc::fstat(fd, &mut stat) } < 0 {
                continue;
            }
            if (stat.st_mode & libc::S_IFMT) != libc::S_IFSOCK {
                continue;
            }

            set_descriptor_label(fd, XATTR_IPIN, SMACK_STAR);
            set_descriptor_label(fd, XATTR_IPOUT, SMACK_WEB);
            debug!("relabeled inherited socket descriptor {}", fd);
            self.audit.record(AuditEvent::new(
                AuditEventKind::DescriptorRelabeled,
                format!("descriptor {} relabeled", fd),
            ));
        }
    }
}

/// Read the peer's security context from the connection socket. An empty
/// or absent context is a normal outcome, not an error.
fn peer_label(fd: RawFd) -> Option<String> {
    let mut buf = [0u8; SMACK_SIZE];
    let mut len = buf.len() as libc::socklen_t;
    // SAFETY: buf outlives the call and len reflects its capacity; the
    // kernel writes at most len bytes and updates len.
    let rc = unsafe {
        libc::getsockopt(
            fd,
            libc::SOL_SOCKET,
            libc::SO_PEERSEC,
            buf.as_mut_ptr().cast(),
            &mut len,
        )
    };
    if rc < 0 {
        return None;
    }
    let len = len as usize;
    if len == 0 || (len == 1 && buf[0] == 0) {
        return None;
    }
    let end = buf[..len].iter().position(|&b| b == 0).unwrap_or(len);
    let label = String::from_utf8_lossy(&buf[..end]).into_owned();
    if label.is_empty() {
        None
    } else {
        Some(label)
    }
}

/// Read the peer's credentials from the connection socket.
fn peer_credentials(fd: RawFd) -> Option<UnixCredentials> {
    if fd < 0 {
        return None;
    }
    // SAFETY: fd is non-negative and the caller guarantees it stays open
    // for the call.
    let fd = unsafe { BorrowedFd::borrow_raw(fd) };
    getsockopt(&fd, PeerCredentials).ok()
}

/// Best-effort executable name of a local peer, for diagnostics only.
fn resolve_command(pid: libc::pid_t) -> Option<String> {
    let cmdline = std::fs::read(format!("/proc/{}/cmdline", pid)).ok()?;
    let first = cmdline.split(|&b| b == 0).next()?;
    if first.is_empty() {
        return None;
    }
    Some(String::from_utf8_lossy(first).into_owned())
}

/// Read the running process's own security context, falling back to the
/// floor label when the attribute is unreadable.
fn fetch_process_label(path: &Path) -> SmackLabel {
    match std::fs::read(path) {
        Ok(raw) => {
            let end = raw
                .iter()
                .position(|&b| b == 0 || b == b'\n')
                .unwrap_or(raw.len());
            let label = String::from_utf8_lossy(&raw[..end]).into_owned();
            if label.is_empty() {
                SmackLabel::new(SMACK_FLOOR)
            } else {
                SmackLabel::new(&label)
            }
        }
        Err(e) => {
            warn!(
                "failed to read {}, using \"{}\": {}",
                path.display(),
                SMACK_FLOOR,
                e
            );
            SmackLabel::new(SMACK_FLOOR)
        }
    }
}

/// Set one security extended attribute on a descriptor, best-effort.
fn set_descriptor_label(fd: RawFd, name: &str, value: &str) {
    let Ok(name) = CString::new(name) else {
        return;
    };
    // SAFETY: name is a valid NUL-terminated string and value points to
    // value.len() live bytes.
    let rc = unsafe {
        libc::fsetxattr(
            fd,
            name.as_ptr(),
            value.as_ptr().cast(),
            value.len(),
            0,
        )
    };
    if rc < 0 {
        warn!(
            "failed to relabel descriptor {}: {}",
            fd,
            std::io::Error::last_os_error()
        );
    }
}
