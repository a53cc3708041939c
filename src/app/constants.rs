pub(crate) const STATUS_READY: &str = "Ready";
pub(crate) const STATUS_CANCELLED: &str = "Cancelled";

pub(crate) const LOG_TIMESTAMP_FORMAT: &str = "%m-%d %H:%M:%S";
pub(crate) const LOG_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub(crate) const LOG_SEPARATOR: &str = " | ";
pub(crate) const LOG_NO_LOGS_MESSAGE: &str = "No logs yet";

pub(crate) const LOG_RETENTION_DAYS: i64 = 7;
pub(crate) const LOG_MAX_ENTRIES: usize = 10_000;
pub(crate) const LOG_MAX_IN_MEMORY: usize = 100;

pub(crate) const TRANSFER_LOG_THRESHOLD_BYTES: u64 = 1024 * 1024;

pub(crate) const NOTICE_TRANSFER_DONE_TITLE: &str = "Transfer complete";
pub(crate) const NOTICE_TRANSFER_FAILED_TITLE: &str = "Transfer failed";
pub(crate) const NOTICE_LIST_FAILED_TITLE: &str = "Cannot open directory";
pub(crate) const NOTHING_MARKED_MESSAGE: &str = "Nothing marked yet. Press Space to mark entries.";
pub(crate) const TRANSFER_RUNNING_MESSAGE: &str = "A transfer is still running";
