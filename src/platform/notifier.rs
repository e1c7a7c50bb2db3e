use crate::db::kv::KvStore;
use crate::models::notification::Notification;
use crate::ui::messages;
use std::rc::Rc;

/// Fire-and-forget channel to the user. Implementations must not fail.
pub trait Notifier {
    fn notify(&self, notification: &Notification);
}

/// Prints notifications on the terminal and keeps a copy in the audit log.
pub struct ConsoleNotifier {
    kv: Rc<dyn KvStore>,
    quiet: bool,
}

impl ConsoleNotifier {
    pub fn new(kv: Rc<dyn KvStore>) -> Self {
        Self { kv, quiet: false }
    }

    /// Only record to the audit log (used by the background invocation).
    pub fn quiet(kv: Rc<dyn KvStore>) -> Self {
        Self { kv, quiet: true }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: &Notification) {
        tracing::info!(kind = notification.kind.as_str(), title = %notification.title, "notification");
        if !self.quiet {
            messages::notice(notification);
        }
        self.kv
            .audit("notify", notification.kind.as_str(), &notification.to_string());
    }
}
