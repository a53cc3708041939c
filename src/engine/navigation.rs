use anyhow::{Context, Result};

use crate::engine::gateway::{RemoteGateway, join_remote};
use crate::model::DirectoryLevel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Descent {
    Entered,
    NotDirectory,
    /// The directory test itself failed; treated like a file.
    ProbeFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ascent {
    Popped,
    ExitToForm,
}

/// Stack of listed directories. Only the levels on the stack are cached.
#[derive(Debug, Clone)]
pub(crate) struct NavigationState {
    stack: Vec<DirectoryLevel>,
}

impl NavigationState {
    pub(crate) fn open(gateway: &dyn RemoteGateway, path: &str) -> Result<Self> {
        let level = list_level(gateway, path)?;
        Ok(Self { stack: vec![level] })
    }

    pub(crate) fn current(&self) -> &DirectoryLevel {
        // The stack is created with one level and `ascend` never pops it.
        &self.stack[self.stack.len() - 1]
    }

    fn current_mut(&mut self) -> &mut DirectoryLevel {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    pub(crate) fn depth(&self) -> usize {
        self.stack.len()
    }

    pub(crate) fn descend(&mut self, gateway: &dyn RemoteGateway, name: &str) -> Result<Descent> {
        let path = join_remote(&self.current().path, name);
        match gateway.is_directory(&path) {
            Ok(true) => {}
            Ok(false) => return Ok(Descent::NotDirectory),
            Err(err) => return Ok(Descent::ProbeFailed(format!("{err:#}"))),
        }
        let level = list_level(gateway, &path)?;
        self.stack.push(level);
        Ok(Descent::Entered)
    }

    pub(crate) fn ascend(&mut self) -> Ascent {
        if self.depth() > 1 {
            self.stack.pop();
            Ascent::Popped
        } else {
            Ascent::ExitToForm
        }
    }

    /// Re-lists the current level; on failure the old listing stays.
    pub(crate) fn refresh(&mut self, gateway: &dyn RemoteGateway) -> Result<()> {
        let path = self.current().path.clone();
        let fresh = list_level(gateway, &path)?;
        let level = self.current_mut();
        level.entries = fresh.entries;
        Ok(())
    }

    pub(crate) fn move_cursor(&mut self, delta: isize, show_hidden: bool) {
        let visible = self.current().visible_entries(show_hidden).len();
        let level = self.current_mut();
        if visible == 0 {
            level.cursor = 0;
            return;
        }
        let next = if delta.is_negative() {
            level.cursor.saturating_sub(delta.unsigned_abs())
        } else {
            level.cursor.saturating_add(delta.unsigned_abs())
        };
        level.cursor = next.min(visible - 1);
    }

    pub(crate) fn clamp_cursor(&mut self, show_hidden: bool) {
        self.move_cursor(0, show_hidden);
    }
}

fn list_level(gateway: &dyn RemoteGateway, path: &str) -> Result<DirectoryLevel> {
    let entries = gateway
        .list_entries(path)
        .with_context(|| format!("list {path}"))?;
    Ok(DirectoryLevel {
        path: path.to_string(),
        entries,
        cursor: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::gateway::MockGateway;

    fn tree() -> MockGateway {
        let gateway = MockGateway::default();
        gateway.add_file("/home/u/report.txt", b"r");
        gateway.add_file("/home/u/data/x.csv", b"1,2");
        gateway.add_file("/home/u/.profile", b"p");
        gateway
    }

    #[test]
    fn descend_into_directory_pushes_one_level() {
        let gateway = tree();
        let mut nav = NavigationState::open(&gateway, "/home/u").unwrap();
        assert_eq!(nav.depth(), 1);
        assert_eq!(nav.descend(&gateway, "data").unwrap(), Descent::Entered);
        assert_eq!(nav.depth(), 2);
        assert_eq!(nav.current().path, "/home/u/data");
        assert_eq!(nav.current().entries[0].path, "/home/u/data/x.csv");
    }

    #[test]
    fn descend_into_file_is_noop() {
        let gateway = tree();
        let mut nav = NavigationState::open(&gateway, "/home/u").unwrap();
        assert_eq!(
            nav.descend(&gateway, "report.txt").unwrap(),
            Descent::NotDirectory
        );
        assert_eq!(nav.depth(), 1);
    }

    #[test]
    fn failed_probe_is_noop() {
        let gateway = tree();
        gateway.fail_probe("/home/u/data");
        let mut nav = NavigationState::open(&gateway, "/home/u").unwrap();
        let outcome = nav.descend(&gateway, "data").unwrap();
        assert!(matches!(outcome, Descent::ProbeFailed(_)));
        assert_eq!(nav.depth(), 1);
        assert!(!gateway.calls().contains(&"list /home/u/data".to_string()));
    }

    #[test]
    fn failed_listing_leaves_stack_unchanged() {
        let gateway = tree();
        gateway.fail_list("/home/u/data");
        let mut nav = NavigationState::open(&gateway, "/home/u").unwrap();
        let err = nav.descend(&gateway, "data").unwrap_err();
        assert!(format!("{err:#}").contains("/home/u/data"));
        assert_eq!(nav.depth(), 1);
        assert_eq!(nav.current().path, "/home/u");
    }

    #[test]
    fn ascend_pops_until_first_level() {
        let gateway = tree();
        let mut nav = NavigationState::open(&gateway, "/home/u").unwrap();
        nav.descend(&gateway, "data").unwrap();
        assert_eq!(nav.ascend(), Ascent::Popped);
        assert_eq!(nav.depth(), 1);
        assert_eq!(nav.ascend(), Ascent::ExitToForm);
        assert_eq!(nav.depth(), 1);
        assert_eq!(nav.current().path, "/home/u");
    }

    #[test]
    fn cursor_is_restored_after_ascend() {
        let gateway = tree();
        let mut nav = NavigationState::open(&gateway, "/home/u").unwrap();
        nav.move_cursor(1, false);
        assert_eq!(nav.current().highlighted(false).unwrap().name, "data");
        nav.descend(&gateway, "data").unwrap();
        assert_eq!(nav.current().cursor, 0);
        nav.ascend();
        assert_eq!(nav.current().cursor, 1);
    }

    #[test]
    fn cursor_clamps_to_visible_entries() {
        let gateway = tree();
        let mut nav = NavigationState::open(&gateway, "/home/u").unwrap();
        nav.move_cursor(100, true);
        assert_eq!(nav.current().cursor, 2);
        nav.clamp_cursor(false);
        assert_eq!(nav.current().cursor, 1);
        nav.move_cursor(-100, false);
        assert_eq!(nav.current().cursor, 0);
    }

    #[test]
    fn refresh_keeps_old_entries_on_failure() {
        let gateway = tree();
        let mut nav = NavigationState::open(&gateway, "/home/u").unwrap();
        gateway.add_file("/home/u/new.log", b"n");
        nav.refresh(&gateway).unwrap();
        assert_eq!(nav.current().entries.len(), 4);
        gateway.fail_list("/home/u");
        assert!(nav.refresh(&gateway).is_err());
        assert_eq!(nav.current().entries.len(), 4);
    }
}
