use std::collections::btree_map;
use std::collections::BTreeMap;

use elbsign_core::{Error, Result};

use crate::constants::RESERVED_PARAMS;

/// Operation parameters of one Query API call.
///
/// Keys are unique and iterate in byte order, which is the canonical order
/// used for signing. Insertion order is irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter, returning the previous value of the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Get a parameter value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate parameters in byte order of their keys.
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }

    /// Reject keys that belong to the signer.
    pub fn check_reserved(&self) -> Result<()> {
        match self.0.keys().find(|k| RESERVED_PARAMS.contains(&k.as_str())) {
            Some(k) => Err(Error::request_invalid(
                "parameter collides with a reserved authentication field",
            )
            .with_context(format!("key: {k}"))),
            None => Ok(()),
        }
    }

    /// Flatten a list into `<prefix>.member.<n>.<suffix>` keys, `n` starting at 1.
    ///
    /// ```
    /// use elbsign_aws_elb::Params;
    ///
    /// let mut params = Params::new();
    /// params.insert_members("Instances", "InstanceId", ["i-111", "i-222"]);
    /// assert_eq!(params.get("Instances.member.2.InstanceId"), Some("i-222"));
    /// ```
    pub fn insert_members<I, S>(&mut self, prefix: &str, suffix: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for (idx, value) in values.into_iter().enumerate() {
            self.insert(format!("{prefix}.member.{}.{suffix}", idx + 1), value);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Params {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// One or more EC2 instance ids, in caller order.
///
/// Converts from a single id as well as from lists:
///
/// ```
/// use elbsign_aws_elb::InstanceIds;
///
/// assert_eq!(InstanceIds::from("i-111").len(), 1);
/// assert_eq!(InstanceIds::from(vec!["i-111", "i-222"]).len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceIds(Vec<String>);

impl InstanceIds {
    /// Number of ids.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether there are no ids.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate ids in caller order.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    /// Make sure there is at least one id and none of them is empty.
    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(Error::request_invalid("at least one instance id is required"));
        }
        if let Some(idx) = self.0.iter().position(|v| v.is_empty()) {
            return Err(Error::request_invalid("instance id must not be empty")
                .with_context(format!("index: {}", idx + 1)));
        }
        Ok(())
    }
}

impl From<&str> for InstanceIds {
    fn from(value: &str) -> Self {
        Self(vec![value.to_string()])
    }
}

impl From<String> for InstanceIds {
    fn from(value: String) -> Self {
        Self(vec![value])
    }
}

impl From<&String> for InstanceIds {
    fn from(value: &String) -> Self {
        Self(vec![value.clone()])
    }
}

impl From<Vec<String>> for InstanceIds {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

impl From<Vec<&str>> for InstanceIds {
    fn from(value: Vec<&str>) -> Self {
        Self(value.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for InstanceIds {
    fn from(value: &[&str]) -> Self {
        Self(value.iter().map(|v| v.to_string()).collect())
    }
}

impl From<&[String]> for InstanceIds {
    fn from(value: &[String]) -> Self {
        Self(value.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for InstanceIds {
    fn from(value: [&str; N]) -> Self {
        Self(value.iter().map(|v| v.to_string()).collect())
    }
}

impl<'a> IntoIterator for &'a InstanceIds {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elbsign_core::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_params_iterate_in_byte_order() {
        let params: Params = [("b", "1"), ("B", "2"), ("a", "3"), ("LoadBalancerName", "lb1")]
            .into_iter()
            .collect();

        let keys = params.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>();
        assert_eq!(keys, vec!["B", "LoadBalancerName", "a", "b"]);
    }

    #[test]
    fn test_params_insertion_order_is_irrelevant() {
        let mut l = Params::new();
        l.insert("Zeta", "z");
        l.insert("Alpha", "a");
        let mut r = Params::new();
        r.insert("Alpha", "a");
        r.insert("Zeta", "z");

        assert_eq!(l, r);
    }

    #[test]
    fn test_check_reserved() {
        let params: Params = [("LoadBalancerName", "lb1")].into_iter().collect();
        assert!(params.check_reserved().is_ok());

        for key in RESERVED_PARAMS {
            let params: Params = [(key, "x")].into_iter().collect();
            let err = params.check_reserved().expect_err("reserved key must be rejected");
            assert_eq!(err.kind(), ErrorKind::RequestInvalid);
            assert_eq!(err.context(), &[format!("key: {key}")]);
        }

        // Matching is exact, not case-insensitive.
        let params: Params = [("action", "x")].into_iter().collect();
        assert!(params.check_reserved().is_ok());
    }

    #[test]
    fn test_insert_members() {
        let mut params = Params::new();
        params.insert_members("Instances", "InstanceId", ["i-111", "i-222"]);

        assert_eq!(
            params.clone().into_iter().collect::<Vec<_>>(),
            vec![
                (
                    "Instances.member.1.InstanceId".to_string(),
                    "i-111".to_string()
                ),
                (
                    "Instances.member.2.InstanceId".to_string(),
                    "i-222".to_string()
                ),
            ]
        );
        assert!(params.get("InstanceId").is_none());
    }

    #[test]
    fn test_instance_ids_validate() {
        assert!(InstanceIds::from("i-111").validate().is_ok());
        assert!(InstanceIds::from(vec!["i-111", "i-222"]).validate().is_ok());
        assert!(InstanceIds::from(Vec::<String>::new()).validate().is_err());

        let err = InstanceIds::from(["i-111", ""])
            .validate()
            .expect_err("empty id must be rejected");
        assert_eq!(err.context(), &["index: 2".to_string()]);
    }

    #[test]
    fn test_instance_ids_keep_order() {
        let ids = InstanceIds::from(vec!["i-333".to_string(), "i-111".to_string()]);
        assert_eq!(
            ids.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["i-333", "i-111"]
        );
    }
}
