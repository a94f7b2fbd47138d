//! User-facing notifications.
//!
//! Controllers report outcomes as `Notice`s over an injected `Notifier`.
//! The UI owns the receiving end and decides how to show a banner and
//! whether to vibrate.

use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub vibrate: bool,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
            vibrate: true,
        }
    }

    pub fn error(message: impl Into<String>, vibrate: bool) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
            vibrate,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
            vibrate: false,
        }
    }
}

/// Sending half of the notice channel. Clone is cheap.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    tx: Option<mpsc::UnboundedSender<Notice>>,
}

impl Notifier {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A notifier that drops everything
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn send(&self, notice: Notice) {
        match self.tx {
            Some(ref tx) => {
                if tx.send(notice).is_err() {
                    debug!("Notice receiver dropped");
                }
            }
            None => debug!(message = %notice.message, "Notice discarded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_delivers_in_order() {
        let (notifier, mut rx) = Notifier::channel();
        notifier.send(Notice::info("first"));
        notifier.clone().send(Notice::success("second"));

        assert_eq!(rx.try_recv().unwrap().message, "first");
        let second = rx.try_recv().unwrap();
        assert_eq!(second.kind, NoticeKind::Success);
        assert!(second.vibrate);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_send_after_receiver_dropped_is_harmless() {
        let (notifier, rx) = Notifier::channel();
        drop(rx);
        notifier.send(Notice::error("gone", true));
        Notifier::disabled().send(Notice::info("nobody listens"));
    }
}
