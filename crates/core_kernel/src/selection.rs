//! Record selections
//!
//! Operations such as `export_record` act on exactly one record. Callers
//! pass a slice and narrow it with [`ensure_one`] before doing any work.

use crate::error::CoreError;

/// Returns the only record of `records`, or `CoreError::EnsureOne`.
pub fn ensure_one<'a, T>(model: &str, records: &'a [T]) -> Result<&'a T, CoreError> {
    match records {
        [record] => Ok(record),
        _ => Err(CoreError::EnsureOne {
            model: model.to_string(),
            count: records.len(),
        }),
    }
}
