//! Attention signals and the distraction monitor.
//!
//! Platforms report focus changes (browser tab visibility, window focus,
//! native app foreground state, idleness) as [`AttentionSignal`]s. The
//! [`AttentionMonitor`] folds them into a single visibility flag and yields
//! a [`DistractionKind`] once per loss of attention.

use async_trait::async_trait;
use focusforge_core::DistractionKind;
use tokio::sync::mpsc;

/// A gain or loss of user attention reported by a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttentionSignal {
    /// Browser tab hidden
    TabHidden,
    /// Browser tab visible again
    TabVisible,
    /// Window lost focus
    WindowBlur,
    /// Window regained focus
    WindowFocus,
    /// Native app moved to the background
    AppBackground,
    /// Native app back in the foreground
    AppForeground,
    /// No input for a while
    Idle,
}

impl AttentionSignal {
    /// The distraction kind a loss signal stands for; `None` for gains.
    pub fn loss_kind(&self) -> Option<DistractionKind> {
        match self {
            AttentionSignal::TabHidden => Some(DistractionKind::TabSwitch),
            AttentionSignal::WindowBlur => Some(DistractionKind::WindowBlur),
            AttentionSignal::AppBackground => Some(DistractionKind::AppBackground),
            AttentionSignal::Idle => Some(DistractionKind::Idle),
            AttentionSignal::TabVisible
            | AttentionSignal::WindowFocus
            | AttentionSignal::AppForeground => None,
        }
    }

    pub fn is_gain(&self) -> bool {
        self.loss_kind().is_none()
    }
}

/// Debounced visibility state.
///
/// While attached, the first loss signal after attention was held yields a
/// distraction kind; further losses are swallowed until a gain signal
/// arrives. While detached every signal is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttentionMonitor {
    visible: bool,
    attached: bool,
}

impl Default for AttentionMonitor {
    fn default() -> Self {
        Self {
            visible: true,
            attached: false,
        }
    }
}

impl AttentionMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach for a fresh session: attention is assumed held.
    pub fn restart(&mut self) {
        self.visible = true;
        self.attached = true;
    }

    /// Re-attach after a pause, keeping the visibility flag.
    pub fn attach(&mut self) {
        self.attached = true;
    }

    pub fn detach(&mut self) {
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Feed one signal. Returns the kind to log, if this was a fresh loss.
    pub fn observe(&mut self, signal: AttentionSignal) -> Option<DistractionKind> {
        if !self.attached {
            return None;
        }

        match signal.loss_kind() {
            Some(kind) if self.visible => {
                self.visible = false;
                Some(kind)
            }
            Some(_) => None,
            None => {
                self.visible = true;
                None
            }
        }
    }

    /// Undo a loss whose distraction could not be recorded, so the next
    /// loss signal is reported again.
    pub fn revert_loss(&mut self) {
        self.visible = true;
    }
}

/// A platform feed of attention signals.
#[async_trait]
pub trait AttentionSource: Send {
    /// Next signal, or `None` once the source is closed.
    async fn next_signal(&mut self) -> Option<AttentionSignal>;
}

/// Sending half of a [`ChannelSource`].
#[derive(Debug, Clone)]
pub struct AttentionSender {
    tx: mpsc::UnboundedSender<AttentionSignal>,
}

impl AttentionSender {
    /// Push a signal. Returns `false` once the receiving side is gone.
    pub fn send(&self, signal: AttentionSignal) -> bool {
        self.tx.send(signal).is_ok()
    }
}

/// Attention source fed through a channel by an embedding UI or bridge.
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::UnboundedReceiver<AttentionSignal>,
}

#[async_trait]
impl AttentionSource for ChannelSource {
    async fn next_signal(&mut self) -> Option<AttentionSignal> {
        self.rx.recv().await
    }
}

/// Create a connected sender and source.
pub fn attention_channel() -> (AttentionSender, ChannelSource) {
    let (tx, rx) = mpsc::unbounded_channel();
    (AttentionSender { tx }, ChannelSource { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attached() -> AttentionMonitor {
        let mut monitor = AttentionMonitor::new();
        monitor.restart();
        monitor
    }

    #[test]
    fn test_repeated_blur_logs_once() {
        let mut monitor = attached();
        assert_eq!(
            monitor.observe(AttentionSignal::WindowBlur),
            Some(DistractionKind::WindowBlur)
        );
        assert_eq!(monitor.observe(AttentionSignal::WindowBlur), None);

        monitor.observe(AttentionSignal::WindowFocus);
        assert_eq!(
            monitor.observe(AttentionSignal::WindowBlur),
            Some(DistractionKind::WindowBlur)
        );
    }

    #[test]
    fn test_sources_share_one_flag() {
        let mut monitor = attached();
        assert_eq!(
            monitor.observe(AttentionSignal::TabHidden),
            Some(DistractionKind::TabSwitch)
        );
        // Blur after the tab was hidden is the same loss of attention
        assert_eq!(monitor.observe(AttentionSignal::WindowBlur), None);
        assert_eq!(monitor.observe(AttentionSignal::AppBackground), None);

        // Any gain restores attention
        monitor.observe(AttentionSignal::AppForeground);
        assert_eq!(monitor.observe(AttentionSignal::Idle), Some(DistractionKind::Idle));
    }

    #[test]
    fn test_detached_ignores_signals() {
        let mut monitor = AttentionMonitor::new();
        assert_eq!(monitor.observe(AttentionSignal::TabHidden), None);
        assert!(monitor.is_visible());

        let mut monitor = attached();
        monitor.observe(AttentionSignal::TabHidden);
        monitor.detach();
        monitor.observe(AttentionSignal::TabVisible);
        assert!(!monitor.is_visible());

        // Pause/resume keeps the flag, a new session clears it
        monitor.attach();
        assert_eq!(monitor.observe(AttentionSignal::TabHidden), None);
        monitor.restart();
        assert_eq!(
            monitor.observe(AttentionSignal::TabHidden),
            Some(DistractionKind::TabSwitch)
        );
    }

    #[tokio::test]
    async fn test_channel_source() {
        let (tx, mut source) = attention_channel();
        assert!(tx.send(AttentionSignal::AppBackground));
        drop(tx);

        assert_eq!(source.next_signal().await, Some(AttentionSignal::AppBackground));
        assert_eq!(source.next_signal().await, None);
    }
}
