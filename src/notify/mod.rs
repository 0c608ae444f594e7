//! Blocking user notifications raised by the views.

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Failure,
}

/// One user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Failure,
            message: message.into(),
        }
    }
}

/// Sink for notices. The presentation layer decides how to show them.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Forwards notices over an unbounded channel to whoever renders them.
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Success => tracing::info!(message = %notice.message, "notice"),
            NoticeKind::Failure => tracing::warn!(message = %notice.message, "notice"),
        }
        if self.tx.send(notice).is_err() {
            tracing::debug!("Notice dropped: no receiver");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_notifier_forwards_in_order() {
        let (notifier, mut rx) = ChannelNotifier::new();
        notifier.notify(Notice::success("saved"));
        notifier.notify(Notice::failure("boom"));

        assert_eq!(rx.try_recv().unwrap(), Notice::success("saved"));
        assert_eq!(rx.try_recv().unwrap(), Notice::failure("boom"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_notify_without_receiver_does_not_panic() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        notifier.notify(Notice::failure("nobody listening"));
    }
}
