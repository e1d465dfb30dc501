use fx_core::RawAssignments;

/// Durable home of the single cached assignments snapshot.
pub trait Storage: Send + Sync {
    fn load_assignments(&self) -> anyhow::Result<Option<RawAssignments>>;

    /// Replaces the whole snapshot; nothing from the previous one survives.
    fn save_assignments(&self, raw: &RawAssignments) -> anyhow::Result<()>;

    fn clear_assignments(&self) -> anyhow::Result<()>;
}
