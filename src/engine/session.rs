use std::sync::Arc;

use anyhow::Result;

use crate::engine::gateway::RemoteGateway;
use crate::engine::navigation::{Ascent, Descent, NavigationState};
use crate::engine::preview::{PreviewOutcome, fetch_preview};
use crate::engine::selection::SelectionSet;
use crate::model::{ConnectionConfig, DirectoryLevel};

/// One authenticated browsing session: who we are connected as, the
/// gateway, where we are, and what is marked.
pub(crate) struct Session {
    pub(crate) config: ConnectionConfig,
    gateway: Arc<dyn RemoteGateway>,
    pub(crate) navigation: NavigationState,
    pub(crate) selection: SelectionSet,
}

impl Session {
    pub(crate) fn open(
        config: ConnectionConfig,
        gateway: Arc<dyn RemoteGateway>,
        start_dir: &str,
    ) -> Result<Self> {
        let navigation = NavigationState::open(gateway.as_ref(), start_dir)?;
        Ok(Self {
            config,
            gateway,
            navigation,
            selection: SelectionSet::default(),
        })
    }

    pub(crate) fn current(&self) -> &DirectoryLevel {
        self.navigation.current()
    }

    pub(crate) fn descend(&mut self, name: &str) -> Result<Descent> {
        self.navigation.descend(self.gateway.as_ref(), name)
    }

    pub(crate) fn ascend(&mut self) -> Ascent {
        self.navigation.ascend()
    }

    pub(crate) fn refresh(&mut self) -> Result<()> {
        self.navigation.refresh(self.gateway.as_ref())
    }

    pub(crate) fn toggle_selection(&mut self, path: &str) -> bool {
        self.selection.toggle(path)
    }

    pub(crate) fn is_selected(&self, path: &str) -> bool {
        self.selection.is_marked(path)
    }

    pub(crate) fn marked(&self) -> Vec<String> {
        self.selection.all_marked().to_vec()
    }

    pub(crate) fn preview(&self, path: &str) -> PreviewOutcome {
        fetch_preview(self.gateway.as_ref(), path)
    }
}

/// Picks the first directory that exists out of the remembered directory,
/// `/home/<user>`, the remote home, and `/`.
pub(crate) fn resolve_start_dir(
    gateway: &dyn RemoteGateway,
    user: &str,
    remembered: Option<&str>,
) -> String {
    let home_guess = format!("/home/{user}");
    let candidates = remembered
        .into_iter()
        .map(str::to_string)
        .chain(std::iter::once(home_guess))
        .chain(gateway.home_dir().ok().filter(|home| !home.trim().is_empty()));
    for candidate in candidates {
        if gateway.is_directory(&candidate).unwrap_or(false) {
            return candidate;
        }
    }
    "/".to_string()
}
