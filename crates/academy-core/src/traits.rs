use crate::AcademyError;

/// Key-value persistence used for learner progress.
///
/// Values are opaque strings (callers store JSON). Implementations must be
/// shareable so a single store can back several trackers.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, AcademyError>;

    fn set(&self, key: &str, value: &str) -> Result<(), AcademyError>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), AcademyError>;

    /// Replace the value under `key` with `apply(current)`, holding out other
    /// writers to the same key until it is stored. Nothing is written when
    /// `apply` fails.
    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<&str>) -> Result<String, AcademyError>,
    ) -> Result<String, AcademyError>;
}
