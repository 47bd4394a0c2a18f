use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Lines kept for the snapshot; older ones are dropped first.
pub const LOG_LIMIT: usize = 500;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub round: u32,
    pub message: String,
}

/// Human-readable narration of the battle.
#[derive(Clone, Debug, Default)]
pub struct BattleLog {
    entries: VecDeque<LogEntry>,
}

impl BattleLog {
    pub fn push(&mut self, round: u32, message: impl Into<String>) {
        if self.entries.len() == LOG_LIMIT {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            round,
            message: message.into(),
        });
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_oldest_past_limit() {
        let mut log = BattleLog::default();
        for i in 0..(LOG_LIMIT + 5) {
            log.push(1, format!("line {i}"));
        }
        assert_eq!(log.len(), LOG_LIMIT);
        assert_eq!(log.entries().next().map(|e| e.message.as_str()), Some("line 5"));
    }
}
