//! Navigation, selection, preview and transfer logic, independent of the
//! terminal front end and of the SSH transport.

pub(crate) mod gateway;
pub(crate) mod navigation;
pub(crate) mod preview;
pub(crate) mod selection;
pub(crate) mod session;
pub(crate) mod transfer;
