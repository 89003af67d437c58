use crate::models::OperationLogEntry;
use std::collections::VecDeque;

/// Bounded FIFO of finished operations, oldest evicted first
#[derive(Debug, Clone)]
pub struct OperationHistory {
    entries: VecDeque<OperationLogEntry>,
    capacity: usize,
}

impl OperationHistory {
    /// A zero capacity is bumped to one so the latest entry is always kept
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, entry: OperationLogEntry) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Copy of the entries, oldest first
    pub fn to_vec(&self) -> Vec<OperationLogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OperationKind;

    fn entry(memory_before: u64) -> OperationLogEntry {
        OperationLogEntry::new(OperationKind::FileUpload, memory_before, true)
    }

    #[test]
    fn test_evicts_oldest_at_capacity() {
        let mut history = OperationHistory::new(3);
        assert!(history.is_empty());
        for i in 0..5 {
            history.push(entry(i));
        }

        let kept: Vec<u64> = history.to_vec().iter().map(|e| e.memory_before).collect();
        assert_eq!(kept, vec![2, 3, 4]);
        assert_eq!(history.len(), 3);
        assert!(!history.is_empty());
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let mut history = OperationHistory::new(0);
        history.push(entry(1));
        history.push(entry(2));
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.to_vec()[0].memory_before, 2);
    }
}
