//! Verlauf der ausgeführten Editor-Commands samt Ergebnis.

use std::collections::VecDeque;

use super::{CommandOutcome, EditorCommand};

/// Ein protokollierter Command.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedCommand {
    pub command: EditorCommand,
    /// `None`, wenn der Command mit einem Fehler abgelehnt wurde
    pub outcome: Option<CommandOutcome>,
}

impl LoggedCommand {
    pub fn was_rejected(&self) -> bool {
        self.outcome.is_none()
    }
}

/// Ringpuffer der letzten Commands (älteste fallen heraus).
#[derive(Debug, Default)]
pub struct CommandLog {
    entries: VecDeque<LoggedCommand>,
}

impl CommandLog {
    const MAX_ENTRIES: usize = 1000;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, command: EditorCommand, outcome: Option<CommandOutcome>) {
        if self.entries.len() == Self::MAX_ENTRIES {
            self.entries.pop_front();
        }
        self.entries.push_back(LoggedCommand { command, outcome });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&LoggedCommand> {
        self.entries.back()
    }

    /// Einträge von alt nach neu.
    pub fn iter(&self) -> impl Iterator<Item = &LoggedCommand> + '_ {
        self.entries.iter()
    }

    pub fn rejected_count(&self) -> usize {
        self.entries.iter().filter(|e| e.was_rejected()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_verwirft_aelteste_eintraege() {
        let mut log = CommandLog::new();
        log.record(EditorCommand::Redo, None);
        for _ in 0..CommandLog::MAX_ENTRIES {
            log.record(EditorCommand::Undo, Some(CommandOutcome::Ignored));
        }
        assert_eq!(log.len(), CommandLog::MAX_ENTRIES);
        assert_eq!(log.rejected_count(), 0);
        assert!(log.iter().all(|e| e.command == EditorCommand::Undo));
    }

    #[test]
    fn abgelehnte_commands_werden_markiert() {
        let mut log = CommandLog::new();
        log.record(EditorCommand::HideAll, None);
        assert!(log.last().is_some_and(LoggedCommand::was_rejected));
    }
}
