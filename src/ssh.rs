use std::io::{self, Read};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use ssh2::{Session, Sftp};

use crate::engine::gateway::{RemoteConnector, RemoteGateway, join_remote};
use crate::model::{AuthConfig, ConnectionConfig, RemoteEntry};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) fn connect_ssh(config: &ConnectionConfig) -> Result<Session> {
    let address = (config.host.as_str(), config.port);
    let mut last_err = None;
    let mut tcp = None;
    for addr in address.to_socket_addrs().context("resolve address")? {
        match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
            Ok(stream) => {
                tcp = Some(stream);
                break;
            }
            Err(err) => last_err = Some(err),
        }
    }
    let tcp = tcp.ok_or_else(|| {
        let err = last_err.unwrap_or_else(|| io::Error::other("connect failed"));
        anyhow::anyhow!("connect to {}:{} failed: {err}", config.host, config.port)
    })?;
    tcp.set_read_timeout(Some(CONNECT_TIMEOUT)).ok();
    tcp.set_write_timeout(Some(CONNECT_TIMEOUT)).ok();

    let mut session = Session::new().context("create session")?;
    session.set_timeout(CONNECT_TIMEOUT.as_millis() as u32);
    session.set_tcp_stream(tcp);
    session.handshake().context("ssh handshake")?;

    match &config.auth {
        AuthConfig::Password { password } => {
            session
                .userauth_password(&config.user, password)
                .context("password auth")?;
        }
        AuthConfig::PrivateKey { path, passphrase } => {
            let path = expand_tilde(path);
            if !path.exists() {
                anyhow::bail!("Private key not found at {}", path.display());
            }
            session
                .userauth_pubkey_file(&config.user, None, &path, passphrase.as_deref())
                .context("private key auth")?;
        }
    }

    if !session.authenticated() {
        anyhow::bail!("Authentication failed");
    }

    Ok(session)
}

pub(crate) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[derive(Debug, Default)]
pub(crate) struct SshConnector;

impl RemoteConnector for SshConnector {
    fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn RemoteGateway>> {
        let session = connect_ssh(config)?;
        let sftp = session.sftp().context("open sftp")?;
        Ok(Arc::new(SftpGateway {
            link: Mutex::new(SftpLink {
                _session: session,
                sftp,
            }),
        }))
    }
}

struct SftpLink {
    // Keeps the transport alive for as long as the SFTP channel is used.
    _session: Session,
    sftp: Sftp,
}

/// Gateway over one SFTP channel. The mutex serializes every remote call.
pub(crate) struct SftpGateway {
    link: Mutex<SftpLink>,
}

impl SftpGateway {
    fn with_sftp<T>(&self, op: impl FnOnce(&Sftp) -> Result<T>) -> Result<T> {
        let link = self
            .link
            .lock()
            .map_err(|_| anyhow::anyhow!("sftp channel poisoned"))?;
        op(&link.sftp)
    }
}

impl RemoteGateway for SftpGateway {
    fn list_entries(&self, path: &str) -> Result<Vec<RemoteEntry>> {
        self.with_sftp(|sftp| {
            let mut entries = Vec::new();
            for (child, stat) in sftp.readdir(Path::new(path)).context("read remote dir")? {
                let name = child
                    .file_name()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| String::from("/"));
                if name == "." || name == ".." {
                    continue;
                }
                // readdir does not follow links; leave those for an explicit probe.
                let is_dir = if stat.file_type().is_symlink() {
                    None
                } else {
                    Some(stat.is_dir())
                };
                entries.push(RemoteEntry {
                    path: join_remote(path, &name),
                    name,
                    is_dir,
                });
            }
            entries.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
            Ok(entries)
        })
    }

    fn is_directory(&self, path: &str) -> Result<bool> {
        self.with_sftp(|sftp| {
            let stat = sftp.stat(Path::new(path)).context("stat remote path")?;
            Ok(stat.is_dir())
        })
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        self.with_sftp(|sftp| {
            let mut remote = sftp.open(Path::new(path)).context("open remote file")?;
            let mut content = Vec::new();
            remote
                .read_to_end(&mut content)
                .context("read remote file")?;
            Ok(content)
        })
    }

    fn file_size(&self, path: &str) -> Result<u64> {
        self.with_sftp(|sftp| {
            let stat = sftp.stat(Path::new(path)).context("stat remote file")?;
            Ok(stat.size.unwrap_or(0))
        })
    }

    fn home_dir(&self) -> Result<String> {
        self.with_sftp(|sftp| {
            let home = sftp.realpath(Path::new(".")).context("resolve remote home")?;
            Ok(home.to_string_lossy().into_owned())
        })
    }
}
