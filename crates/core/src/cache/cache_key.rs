use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};

/// Builder for deterministic cache keys.
///
/// Positional arguments keep their order; keyword arguments are sorted by
/// name. The serialized form is hashed with MD5 into a 32-character hex key.
///
/// ```
/// use econdata_core::CacheKey;
///
/// let a = CacheKey::new().arg("GDP").kwarg("country", "USA").kwarg("source", "all");
/// let b = CacheKey::new().arg("GDP").kwarg("source", "all").kwarg("country", "USA");
/// assert_eq!(a.digest(), b.digest());
/// assert_eq!(a.digest().len(), 32);
/// ```
#[derive(Clone, Debug, Default)]
pub struct CacheKey {
    args: Vec<Value>,
    kwargs: BTreeMap<String, Value>,
}

impl CacheKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Serialize) -> Self {
        self.args.push(to_value(value));
        self
    }

    pub fn kwarg(mut self, name: &str, value: impl Serialize) -> Self {
        self.kwargs.insert(name.to_string(), to_value(value));
        self
    }

    pub fn digest(&self) -> String {
        let kwargs: Vec<(&String, &Value)> = self.kwargs.iter().collect();
        let payload = json!({ "args": self.args, "kwargs": kwargs });
        format!("{:x}", md5::compute(payload.to_string().as_bytes()))
    }
}

// Anything that fails to serialize is keyed by its absence.
fn to_value(value: impl Serialize) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_kwarg_order_does_not_matter() {
        let a = CacheKey::new()
            .arg("indicator")
            .kwarg("start", NaiveDate::from_ymd_opt(2020, 1, 1))
            .kwarg("end", NaiveDate::from_ymd_opt(2024, 1, 1));
        let b = CacheKey::new()
            .arg("indicator")
            .kwarg("end", NaiveDate::from_ymd_opt(2024, 1, 1))
            .kwarg("start", NaiveDate::from_ymd_opt(2020, 1, 1));

        assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn test_arg_order_matters() {
        let a = CacheKey::new().arg("GDP").arg("USA");
        let b = CacheKey::new().arg("USA").arg("GDP");

        assert_ne!(a.digest(), b.digest());
    }

    #[test]
    fn test_digest_is_fixed_length_hex() {
        let key = CacheKey::new().arg("GDP").kwarg("source", Option::<&str>::None).digest();

        assert_eq!(key.len(), 32);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_values_distinguish_keys() {
        let usa = CacheKey::new().arg("GDP").kwarg("country", "USA").digest();
        let gbr = CacheKey::new().arg("GDP").kwarg("country", "GBR").digest();

        assert_ne!(usa, gbr);
    }
}
