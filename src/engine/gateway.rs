use std::sync::Arc;

use anyhow::Result;

use crate::model::{ConnectionConfig, RemoteEntry};

#[cfg(test)]
use std::collections::{HashMap, HashSet};
#[cfg(test)]
use std::sync::Mutex;

/// Remote filesystem operations needed by navigation, preview and transfer.
///
/// Implementations may block on the network. Callers never issue two calls
/// at once against the same gateway.
pub(crate) trait RemoteGateway: Send + Sync {
    /// Children of `path` in the order the remote reports them.
    fn list_entries(&self, path: &str) -> Result<Vec<RemoteEntry>>;
    fn is_directory(&self, path: &str) -> Result<bool>;
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    /// Size in bytes of the file at `path`, without reading it.
    fn file_size(&self, path: &str) -> Result<u64>;
    fn home_dir(&self) -> Result<String>;
}

/// Opens a fresh authenticated gateway for a connection.
pub(crate) trait RemoteConnector: Send + Sync {
    fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn RemoteGateway>>;
}

pub(crate) fn join_remote(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

pub(crate) fn remote_basename(path: &str) -> Option<&str> {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
}

#[cfg(test)]
pub(crate) fn parent_remote_dir(path: &str) -> String {
    path.trim_end_matches('/')
        .rsplit_once('/')
        .map(|(base, _)| if base.is_empty() { "/".to_string() } else { base.to_string() })
        .unwrap_or_else(|| "/".to_string())
}

#[cfg(test)]
#[derive(Debug, Clone)]
enum MockNode {
    Dir(Vec<String>),
    File(Vec<u8>),
}

/// In-memory remote tree. Paths are absolute and `/`-separated; adding a
/// file or directory creates its parents and appends it to the parent's
/// listing in insertion order.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct MockGateway {
    nodes: Mutex<HashMap<String, MockNode>>,
    probe_errors: Mutex<HashSet<String>>,
    list_errors: Mutex<HashSet<String>>,
    read_errors: Mutex<HashSet<String>>,
    home: Mutex<Option<String>>,
    calls: Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockGateway {
    pub(crate) fn add_dir(&self, path: &str) {
        let mut nodes = self.nodes.lock().unwrap();
        Self::insert_node(&mut nodes, path, MockNode::Dir(Vec::new()));
    }

    pub(crate) fn add_file(&self, path: &str, content: &[u8]) {
        let mut nodes = self.nodes.lock().unwrap();
        Self::insert_node(&mut nodes, path, MockNode::File(content.to_vec()));
    }

    pub(crate) fn fail_probe(&self, path: &str) {
        self.probe_errors.lock().unwrap().insert(path.to_string());
    }

    pub(crate) fn fail_list(&self, path: &str) {
        self.list_errors.lock().unwrap().insert(path.to_string());
    }

    pub(crate) fn fail_read(&self, path: &str) {
        self.read_errors.lock().unwrap().insert(path.to_string());
    }

    pub(crate) fn set_home(&self, home: &str) {
        *self.home.lock().unwrap() = Some(home.to_string());
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn touched(&self, path: &str) -> bool {
        self.calls()
            .iter()
            .any(|call| call.split_once(' ').is_some_and(|(_, p)| p == path))
    }

    fn insert_node(nodes: &mut HashMap<String, MockNode>, path: &str, node: MockNode) {
        if path != "/" {
            let parent = parent_remote_dir(path);
            if !nodes.contains_key(&parent) {
                Self::insert_node(nodes, &parent, MockNode::Dir(Vec::new()));
            }
            if let Some(MockNode::Dir(children)) = nodes.get_mut(&parent) {
                let name = remote_basename(path).unwrap_or_default().to_string();
                if !children.contains(&name) {
                    children.push(name);
                }
            }
        }
        match (nodes.get(path), &node) {
            (Some(MockNode::Dir(_)), MockNode::Dir(_)) => {}
            _ => {
                nodes.insert(path.to_string(), node);
            }
        }
    }

    fn record(&self, op: &str, path: &str) {
        self.calls.lock().unwrap().push(format!("{op} {path}"));
    }
}

#[cfg(test)]
impl RemoteGateway for MockGateway {
    fn list_entries(&self, path: &str) -> Result<Vec<RemoteEntry>> {
        self.record("list", path);
        if self.list_errors.lock().unwrap().contains(path) {
            anyhow::bail!("permission denied: {path}");
        }
        let nodes = self.nodes.lock().unwrap();
        let Some(MockNode::Dir(children)) = nodes.get(path) else {
            anyhow::bail!("not a directory: {path}");
        };
        Ok(children
            .iter()
            .map(|name| {
                let full = join_remote(path, name);
                let is_dir = matches!(nodes.get(&full), Some(MockNode::Dir(_)));
                RemoteEntry {
                    name: name.clone(),
                    path: full,
                    is_dir: Some(is_dir),
                }
            })
            .collect())
    }

    fn is_directory(&self, path: &str) -> Result<bool> {
        self.record("probe", path);
        if self.probe_errors.lock().unwrap().contains(path) {
            anyhow::bail!("stat failed: {path}");
        }
        match self.nodes.lock().unwrap().get(path) {
            Some(MockNode::Dir(_)) => Ok(true),
            Some(MockNode::File(_)) => Ok(false),
            None => anyhow::bail!("no such file: {path}"),
        }
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        self.record("read", path);
        if self.read_errors.lock().unwrap().contains(path) {
            anyhow::bail!("read failed: {path}");
        }
        match self.nodes.lock().unwrap().get(path) {
            Some(MockNode::File(content)) => Ok(content.clone()),
            Some(MockNode::Dir(_)) => anyhow::bail!("is a directory: {path}"),
            None => anyhow::bail!("no such file: {path}"),
        }
    }

    fn file_size(&self, path: &str) -> Result<u64> {
        self.record("size", path);
        if self.read_errors.lock().unwrap().contains(path) {
            anyhow::bail!("stat failed: {path}");
        }
        match self.nodes.lock().unwrap().get(path) {
            Some(MockNode::File(content)) => Ok(content.len() as u64),
            Some(MockNode::Dir(_)) => anyhow::bail!("is a directory: {path}"),
            None => anyhow::bail!("no such file: {path}"),
        }
    }

    fn home_dir(&self) -> Result<String> {
        self.home
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| anyhow::anyhow!("home directory unavailable"))
    }
}

/// Hands out the same mock tree for every connection, or a fixed error.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct MockConnector {
    pub(crate) gateway: Arc<MockGateway>,
    error: Mutex<Option<String>>,
    connects: Mutex<usize>,
}

#[cfg(test)]
impl MockConnector {
    pub(crate) fn with_gateway(gateway: Arc<MockGateway>) -> Self {
        Self {
            gateway,
            ..Self::default()
        }
    }

    pub(crate) fn set_error(&self, error: Option<&str>) {
        *self.error.lock().unwrap() = error.map(str::to_string);
    }

    pub(crate) fn connects(&self) -> usize {
        *self.connects.lock().unwrap()
    }
}

#[cfg(test)]
impl RemoteConnector for MockConnector {
    fn connect(&self, _config: &ConnectionConfig) -> Result<Arc<dyn RemoteGateway>> {
        *self.connects.lock().unwrap() += 1;
        if let Some(err) = self.error.lock().unwrap().as_ref() {
            return Err(anyhow::anyhow!(err.clone()));
        }
        Ok(self.gateway.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_remote_handles_root() {
        assert_eq!(join_remote("/", "etc"), "/etc");
        assert_eq!(join_remote("/home/u", "a"), "/home/u/a");
        assert_eq!(join_remote("/home/u/", "a"), "/home/u/a");
    }

    #[test]
    fn remote_basename_rejects_root() {
        assert_eq!(remote_basename("/home/u/report.txt"), Some("report.txt"));
        assert_eq!(remote_basename("/home/u/data/"), Some("data"));
        assert_eq!(remote_basename("/"), None);
        assert_eq!(remote_basename("/tmp/.."), None);
    }

    #[test]
    fn parent_remote_dir_stops_at_root() {
        assert_eq!(parent_remote_dir("/home/u"), "/home");
        assert_eq!(parent_remote_dir("/home"), "/");
        assert_eq!(parent_remote_dir("/"), "/");
    }

    #[test]
    fn mock_lists_in_insertion_order() {
        let gateway = MockGateway::default();
        gateway.add_file("/d/zeta", b"z");
        gateway.add_dir("/d/alpha");
        gateway.add_file("/d/alpha/inner", b"i");
        let names: Vec<String> = gateway
            .list_entries("/d")
            .unwrap()
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert!(gateway.is_directory("/d/alpha").unwrap());
        assert!(!gateway.is_directory("/d/zeta").unwrap());
        assert!(gateway.is_directory("/missing").is_err());
    }
}
