//! The visible game log.
//!
//! Illegal actions and fizzles are reported here with a human-readable
//! explanation; they never crash the game loop.

/// What kind of entry this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    /// A committed game event.
    Event,
    /// An action that was attempted without legality.
    Illegal,
    /// An ability or effect that resolved with no effect.
    Fizzle,
    /// Engine bookkeeping (turn boundaries, sweeps).
    System,
}

/// One entry in the game log.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub turn: u32,
    pub kind: LogKind,
    pub message: String,
}

/// Append-only, human-readable record of what happened in the game.
#[derive(Debug, Clone, Default)]
pub struct GameLog {
    entries: Vec<LogEntry>,
}

impl GameLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: u32, kind: LogKind, message: impl Into<String>) {
        self.entries.push(LogEntry {
            turn,
            kind,
            message: message.into(),
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Entries of one kind, in order.
    pub fn of_kind(&self, kind: LogKind) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    pub fn last_message(&self) -> Option<&str> {
        self.entries.last().map(|e| e.message.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_keeps_order_and_kind() {
        let mut log = GameLog::new();
        log.push(1, LogKind::Event, "Bear deals 2 damage to Bo");
        log.push(1, LogKind::Fizzle, "Bolt fizzles: target is gone");
        assert_eq!(log.entries().len(), 2);
        assert_eq!(log.of_kind(LogKind::Fizzle).count(), 1);
        assert_eq!(log.last_message(), Some("Bolt fizzles: target is gone"));
    }
}
