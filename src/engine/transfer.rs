use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use thiserror::Error;

use crate::engine::gateway::{RemoteGateway, join_remote, remote_basename};
use crate::model::TransferUpdate;

/// Directory levels below a marked path before recursion gives up.
pub(crate) const MAX_TRANSFER_DEPTH: usize = 64;
pub(crate) const DATE_STAMP_FORMAT: &str = "%y%m%d";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TransferSummary {
    pub(crate) files: usize,
    pub(crate) dirs: usize,
    pub(crate) bytes: u64,
}

#[derive(Debug, Error)]
pub(crate) enum TransferError {
    #[error("cannot connect to {host}: {message}")]
    Connect { host: String, message: String },
    #[error("cannot inspect {path}: {message}")]
    Probe { path: String, message: String },
    #[error("cannot list {path}: {message}")]
    List { path: String, message: String },
    #[error("cannot read {path}: {message}")]
    Read { path: String, message: String },
    #[error("{path} has no file name to copy to")]
    InvalidPath { path: String },
    #[error("cannot create directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("cannot write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("{path} is nested more than {limit} directories deep (symlink loop?)")]
    TooDeep { path: String, limit: usize },
    #[error("transfer cancelled at {path}")]
    Cancelled { path: String },
}

impl TransferError {
    /// Where the transfer stopped: a remote path, a local path, or the host.
    pub(crate) fn path(&self) -> String {
        match self {
            TransferError::Connect { host, .. } => host.clone(),
            TransferError::Probe { path, .. }
            | TransferError::List { path, .. }
            | TransferError::Read { path, .. }
            | TransferError::InvalidPath { path }
            | TransferError::TooDeep { path, .. }
            | TransferError::Cancelled { path } => path.clone(),
            TransferError::CreateDir { path, .. } | TransferError::Write { path, .. } => {
                path.display().to_string()
            }
        }
    }
}

/// Creates `<base>/<YYMMDD>` for `today` and returns it.
pub(crate) fn prepare_destination(base: &Path, today: NaiveDate) -> Result<PathBuf> {
    let dir = base.join(today.format(DATE_STAMP_FORMAT).to_string());
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Copies every marked remote path into `local_root`, in order, stopping at
/// the first failure. Files written before a failure are left in place.
pub(crate) fn transfer_marked(
    gateway: &dyn RemoteGateway,
    marked: &[String],
    local_root: &Path,
    tx: &mpsc::Sender<TransferUpdate>,
    cancel_rx: &mpsc::Receiver<()>,
) -> Result<TransferSummary, TransferError> {
    let mut job = TransferJob {
        gateway,
        tx,
        cancel_rx,
        summary: TransferSummary::default(),
    };
    for remote in marked {
        job.copy_path(remote, local_root, 0)?;
    }
    Ok(job.summary)
}

struct TransferJob<'a> {
    gateway: &'a dyn RemoteGateway,
    tx: &'a mpsc::Sender<TransferUpdate>,
    cancel_rx: &'a mpsc::Receiver<()>,
    summary: TransferSummary,
}

impl TransferJob<'_> {
    fn copy_path(&mut self, remote: &str, local_root: &Path, depth: usize) -> Result<(), TransferError> {
        if depth > MAX_TRANSFER_DEPTH {
            return Err(TransferError::TooDeep {
                path: remote.to_string(),
                limit: MAX_TRANSFER_DEPTH,
            });
        }
        let Some(name) = remote_basename(remote) else {
            return Err(TransferError::InvalidPath {
                path: remote.to_string(),
            });
        };
        let local = local_root.join(name);

        self.check_cancel(remote)?;
        let is_dir = self
            .gateway
            .is_directory(remote)
            .map_err(|err| TransferError::Probe {
                path: remote.to_string(),
                message: format!("{err:#}"),
            })?;

        if is_dir {
            self.copy_dir(remote, &local, depth)
        } else {
            self.copy_file(remote, &local)
        }
    }

    fn copy_dir(&mut self, remote: &str, local: &Path, depth: usize) -> Result<(), TransferError> {
        fs::create_dir_all(local).map_err(|source| TransferError::CreateDir {
            path: local.to_path_buf(),
            source,
        })?;
        self.summary.dirs += 1;

        self.check_cancel(remote)?;
        let children = self
            .gateway
            .list_entries(remote)
            .map_err(|err| TransferError::List {
                path: remote.to_string(),
                message: format!("{err:#}"),
            })?;
        for child in children {
            let child_path = join_remote(remote, &child.name);
            self.copy_path(&child_path, local, depth + 1)?;
        }
        Ok(())
    }

    fn copy_file(&mut self, remote: &str, local: &Path) -> Result<(), TransferError> {
        let _ = self.tx.send(TransferUpdate::Started {
            remote: remote.to_string(),
            local: local.to_path_buf(),
        });
        self.check_cancel(remote)?;
        let bytes = self
            .gateway
            .read_file(remote)
            .map_err(|err| TransferError::Read {
                path: remote.to_string(),
                message: format!("{err:#}"),
            })?;
        fs::write(local, &bytes).map_err(|source| TransferError::Write {
            path: local.to_path_buf(),
            source,
        })?;
        let written = bytes.len() as u64;
        self.summary.files += 1;
        self.summary.bytes = self.summary.bytes.saturating_add(written);
        let _ = self.tx.send(TransferUpdate::Bytes(written));
        Ok(())
    }

    fn check_cancel(&self, remote: &str) -> Result<(), TransferError> {
        if self.cancel_rx.try_recv().is_ok() {
            return Err(TransferError::Cancelled {
                path: remote.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::gateway::MockGateway;

    fn run(
        gateway: &MockGateway,
        marked: &[&str],
        root: &Path,
    ) -> Result<TransferSummary, TransferError> {
        let marked: Vec<String> = marked.iter().map(|p| p.to_string()).collect();
        let (tx, _rx) = mpsc::channel();
        let (_cancel_tx, cancel_rx) = mpsc::channel();
        transfer_marked(gateway, &marked, root, &tx, &cancel_rx)
    }

    #[test]
    fn directory_structure_is_mirrored() {
        let gateway = MockGateway::default();
        gateway.add_file("/d/f1", b"first");
        gateway.add_file("/d/sub/f2", b"second");
        let root = tempfile::tempdir().unwrap();

        let summary = run(&gateway, &["/d"], root.path()).unwrap();

        assert_eq!(fs::read(root.path().join("d/f1")).unwrap(), b"first");
        assert_eq!(fs::read(root.path().join("d/sub/f2")).unwrap(), b"second");
        assert_eq!(
            summary,
            TransferSummary {
                files: 2,
                dirs: 2,
                bytes: 11
            }
        );
    }

    #[test]
    fn first_failure_stops_remaining_paths() {
        let gateway = MockGateway::default();
        gateway.add_file("/p1", b"one");
        gateway.add_file("/p2", b"two");
        gateway.fail_probe("/p1");
        let root = tempfile::tempdir().unwrap();

        let err = run(&gateway, &["/p1", "/p2"], root.path()).unwrap_err();

        assert!(matches!(err, TransferError::Probe { .. }));
        assert_eq!(err.path(), "/p1");
        assert!(!gateway.touched("/p2"));
        assert!(!root.path().join("p2").exists());
    }

    #[test]
    fn nested_failure_aborts_and_keeps_earlier_files() {
        let gateway = MockGateway::default();
        gateway.add_file("/d/a", b"a");
        gateway.add_file("/d/b", b"b");
        gateway.add_file("/d/c", b"c");
        gateway.add_file("/later", b"later");
        gateway.fail_read("/d/b");
        let root = tempfile::tempdir().unwrap();

        let err = run(&gateway, &["/d", "/later"], root.path()).unwrap_err();

        assert!(matches!(err, TransferError::Read { .. }));
        assert_eq!(err.path(), "/d/b");
        assert!(root.path().join("d/a").exists());
        assert!(!root.path().join("d/c").exists());
        assert!(!gateway.touched("/d/c"));
        assert!(!gateway.touched("/later"));
    }

    #[test]
    fn listing_failure_inside_tree_names_the_directory() {
        let gateway = MockGateway::default();
        gateway.add_file("/e/a", b"a");
        gateway.add_file("/e/sub/x", b"x");
        gateway.add_file("/e/z", b"z");
        gateway.fail_list("/e/sub");
        let root = tempfile::tempdir().unwrap();

        let err = run(&gateway, &["/e"], root.path()).unwrap_err();

        assert!(matches!(err, TransferError::List { .. }));
        assert_eq!(err.path(), "/e/sub");
        assert!(root.path().join("e/a").exists());
        assert!(!gateway.touched("/e/z"));
    }

    #[test]
    fn unlistable_marked_directory_fails() {
        let gateway = MockGateway::default();
        gateway.add_file("/e/a", b"a");
        gateway.fail_list("/e");
        let root = tempfile::tempdir().unwrap();

        let err = run(&gateway, &["/e"], root.path()).unwrap_err();

        assert!(matches!(err, TransferError::List { .. }));
        assert_eq!(err.path(), "/e");
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn local_file_in_place_of_directory_stops_transfer() {
        let gateway = MockGateway::default();
        gateway.add_file("/d/f", b"f");
        gateway.add_file("/later", b"later");
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("d"), b"in the way").unwrap();

        let err = run(&gateway, &["/d", "/later"], root.path()).unwrap_err();

        assert!(matches!(err, TransferError::CreateDir { .. }));
        assert_eq!(err.path(), root.path().join("d").display().to_string());
        assert!(!gateway.touched("/d/f"));
        assert!(!gateway.touched("/later"));
        assert!(!root.path().join("later").exists());
    }

    #[test]
    fn unwritable_local_file_stops_transfer() {
        let gateway = MockGateway::default();
        gateway.add_file("/f", b"content");
        gateway.add_file("/later", b"later");
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("f")).unwrap();

        let err = run(&gateway, &["/f", "/later"], root.path()).unwrap_err();

        assert!(matches!(err, TransferError::Write { .. }));
        assert_eq!(err.path(), root.path().join("f").display().to_string());
        assert!(!gateway.touched("/later"));
    }

    #[test]
    fn bytes_are_copied_verbatim() {
        let gateway = MockGateway::default();
        let raw: Vec<u8> = (0u8..=255).chain(b"\r\n\n\r".iter().copied()).collect();
        gateway.add_file("/bin/blob", &raw);
        let root = tempfile::tempdir().unwrap();

        run(&gateway, &["/bin/blob"], root.path()).unwrap();

        assert_eq!(fs::read(root.path().join("blob")).unwrap(), raw);
    }

    #[test]
    fn existing_files_are_overwritten() {
        let gateway = MockGateway::default();
        gateway.add_file("/notes.txt", b"new");
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("notes.txt"), b"old and longer").unwrap();

        run(&gateway, &["/notes.txt"], root.path()).unwrap();

        assert_eq!(fs::read(root.path().join("notes.txt")).unwrap(), b"new");
    }

    #[test]
    fn marked_files_and_dirs_land_in_dated_folder() {
        let gateway = MockGateway::default();
        gateway.add_file("/home/u/report.txt", b"quarterly");
        gateway.add_file("/home/u/data/x.csv", b"a,b\n1,2\n");
        let base = tempfile::tempdir().unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        let dest = prepare_destination(base.path(), today).unwrap();
        run(&gateway, &["/home/u/report.txt", "/home/u/data"], &dest).unwrap();

        assert_eq!(dest, base.path().join("250101"));
        assert_eq!(
            fs::read(base.path().join("250101/report.txt")).unwrap(),
            b"quarterly"
        );
        assert_eq!(
            fs::read(base.path().join("250101/data/x.csv")).unwrap(),
            b"a,b\n1,2\n"
        );
    }

    #[test]
    fn same_day_destination_is_reused() {
        let base = tempfile::tempdir().unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let first = prepare_destination(base.path(), today).unwrap();
        fs::write(first.join("kept"), b"k").unwrap();
        let second = prepare_destination(base.path(), today).unwrap();
        assert_eq!(first, second);
        assert!(second.join("kept").exists());
    }

    #[test]
    fn runaway_nesting_fails_instead_of_recursing_forever() {
        let gateway = MockGateway::default();
        let mut deep = String::from("/loop");
        for _ in 0..=MAX_TRANSFER_DEPTH + 1 {
            deep.push_str("/again");
        }
        gateway.add_file(&format!("{deep}/bottom"), b"x");
        let root = tempfile::tempdir().unwrap();

        let err = run(&gateway, &["/loop"], root.path()).unwrap_err();

        assert!(matches!(
            err,
            TransferError::TooDeep {
                limit: MAX_TRANSFER_DEPTH,
                ..
            }
        ));
    }

    #[test]
    fn root_path_is_rejected() {
        let gateway = MockGateway::default();
        gateway.add_dir("/");
        let root = tempfile::tempdir().unwrap();
        let err = run(&gateway, &["/"], root.path()).unwrap_err();
        assert!(matches!(err, TransferError::InvalidPath { .. }));
        assert!(gateway.calls().is_empty());
    }

    #[test]
    fn cancel_stops_before_next_gateway_call() {
        let gateway = MockGateway::default();
        gateway.add_file("/a", b"a");
        let root = tempfile::tempdir().unwrap();
        let (tx, _rx) = mpsc::channel();
        let (cancel_tx, cancel_rx) = mpsc::channel();
        cancel_tx.send(()).unwrap();

        let err =
            transfer_marked(&gateway, &["/a".to_string()], root.path(), &tx, &cancel_rx).unwrap_err();

        assert!(matches!(err, TransferError::Cancelled { .. }));
        assert!(gateway.calls().is_empty());
    }

    #[test]
    fn progress_reports_each_file() {
        let gateway = MockGateway::default();
        gateway.add_file("/d/one", b"1");
        gateway.add_file("/d/two", b"22");
        let root = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::channel();
        let (_cancel_tx, cancel_rx) = mpsc::channel();

        transfer_marked(&gateway, &["/d".to_string()], root.path(), &tx, &cancel_rx).unwrap();

        let mut started = Vec::new();
        let mut bytes = 0;
        while let Ok(update) = rx.try_recv() {
            match update {
                TransferUpdate::Started { remote, .. } => started.push(remote),
                TransferUpdate::Bytes(amount) => bytes += amount,
                TransferUpdate::Done(_) => {}
            }
        }
        assert_eq!(started, vec!["/d/one", "/d/two"]);
        assert_eq!(bytes, 3);
    }
}
