/// Statistics for one sync session
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncStats {
    /// Files in the sender's manifest
    pub files_offered: u64,

    /// Requests sent (receiver) or served (sender)
    pub files_requested: u64,

    /// Files whose content fully crossed the stream
    pub files_transferred: u64,

    /// Raw content bytes moved
    pub bytes_transferred: u64,

    /// Sender files kept locally despite a different hash
    pub hash_mismatches: u64,

    /// Sender files already present with the same hash
    pub already_present: u64,
}

impl SyncStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_transfer(&mut self, bytes: u64) {
        self.files_transferred += 1;
        self.bytes_transferred += bytes;
    }
}
