//! Reusable node validators.

use super::model::FieldBucket;
use crate::diagnostic::Diagnostic;

/// Fails when any of `keys` is absent from the collected fields.
///
/// The message lists the missing keys in the order they were given, e.g.
/// `missing keys: name, width`.
pub fn require_keys<I, S>(keys: I) -> impl Fn(&FieldBucket) -> Vec<Diagnostic> + Send + Sync + 'static
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
    move |bucket| {
        let missing: Vec<&str> = keys
            .iter()
            .filter(|key| bucket.get(key.as_str()).map_or(true, Vec::is_empty))
            .map(String::as_str)
            .collect();
        if missing.is_empty() {
            Vec::new()
        } else {
            vec![Diagnostic::error(format!("missing keys: {}", missing.join(", ")))]
        }
    }
}
