use serde::{Deserialize, Serialize};

/// A submitted modification whose processing is tracked.
///
/// ## Example
/// ```rust
/// use widgetvisor::Revision;
///
/// let rev = Revision::new("r-42", "reason", 3)
///     .with_machine(7)
///     .with_range("[2024-01-01T00:00:00Z,2024-01-01T08:00:00Z)");
/// let json = serde_json::to_value(&rev).unwrap();
/// assert_eq!(json["machineId"], 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    /// Revision id returned by the save call.
    pub id: String,
    /// Kind of modification; also the bus context of its progress events.
    pub kind: String,
    /// Machine the modification applies to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_id: Option<u64>,
    /// Ranges touched by the modification.
    #[serde(default)]
    pub ranges: Vec<String>,
    /// Number of modifications submitted.
    pub total: u32,
}

impl Revision {
    /// Creates a revision of `total` modifications.
    pub fn new(id: impl Into<String>, kind: impl Into<String>, total: u32) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            machine_id: None,
            ranges: Vec::new(),
            total,
        }
    }

    /// Sets the machine the modification applies to.
    #[inline]
    pub fn with_machine(mut self, machine_id: u64) -> Self {
        self.machine_id = Some(machine_id);
        self
    }

    /// Appends one touched range.
    #[inline]
    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.ranges.push(range.into());
        self
    }
}

/// Payload of `modificationEvent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    #[serde(flatten)]
    pub revision: Revision,
    /// Modifications not processed yet.
    pub remaining: u32,
    /// The tracker gave up before `remaining` reached zero.
    #[serde(default)]
    pub failed: bool,
}

impl Progress {
    pub(crate) fn start(revision: Revision) -> Self {
        let remaining = revision.total;
        Self {
            revision,
            remaining,
            failed: false,
        }
    }

    /// Modifications already processed.
    pub fn completed(&self) -> u32 {
        self.revision.total.saturating_sub(self.remaining)
    }

    /// `true` when no further event follows for this revision.
    pub fn is_final(&self) -> bool {
        self.remaining == 0 || self.failed
    }

    pub(crate) fn update(&mut self, remaining: u32) {
        self.remaining = remaining;
        self.revision.total = self.revision.total.max(remaining);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn progress_flattens_the_revision() {
        let mut progress = Progress::start(Revision::new("r1", "reason", 4));
        progress.update(1);
        assert_eq!(progress.completed(), 3);
        assert!(!progress.is_final());

        let value = serde_json::to_value(&progress).unwrap();
        assert_eq!(
            value,
            json!({"id": "r1", "kind": "reason", "ranges": [], "total": 4, "remaining": 1, "failed": false})
        );
        let back: Progress = serde_json::from_value(value).unwrap();
        assert_eq!(back, progress);
    }

    #[test]
    fn reported_backlog_larger_than_total_grows_the_total() {
        let mut progress = Progress::start(Revision::new("r1", "reason", 2));
        progress.update(5);
        assert_eq!(progress.revision.total, 5);
        assert_eq!(progress.completed(), 0);
    }
}
