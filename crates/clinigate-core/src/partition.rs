//! Tenant partition names and their classes.
//!
//! Every request addresses exactly one named partition. The class of a
//! partition is inferred from its name:
//!
//! - `root` - the shared reference-data pool (organizations, practitioners,
//!   practitioner roles, endpoints, administrative Basic records)
//! - `DEFAULT` - the administrative partition for system-management
//!   operations such as partition provisioning
//! - `D<key>` - a doctor-private partition holding only the order records
//!   of the doctor identified by `key`
//!
//! A name that matches none of these is unrecognized and is always rejected
//! by the authorization engine.

use std::fmt;

/// Name of the shared reference-data partition.
pub const ROOT_PARTITION: &str = "root";

/// Name of the administrative partition.
pub const DEFAULT_PARTITION: &str = "DEFAULT";

/// Leading marker character of doctor-private partition names.
pub const DOCTOR_PARTITION_MARKER: char = 'D';

/// Extract the doctor key from a `D<key>` partition name.
///
/// This is a fixed-width prefix trim, not a general parse: the naming scheme
/// is a compatibility contract with existing tenant names, so exactly one
/// leading marker character is removed and the remainder is the key.
/// Returns `None` when the marker is absent or nothing follows it.
#[must_use]
pub fn parse_doctor_key(name: &str) -> Option<&str> {
    let key = name.strip_prefix(DOCTOR_PARTITION_MARKER)?;
    if key.is_empty() { None } else { Some(key) }
}

/// The class of a partition, inferred from its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PartitionClass {
    /// The shared reference-data pool.
    Root,
    /// The administrative partition.
    Default,
    /// A doctor-private partition scoped to the contained doctor key.
    Doctor(String),
}

impl PartitionClass {
    /// Classify a partition name.
    ///
    /// `DEFAULT` is matched before the doctor-marker pattern; it starts with
    /// the marker character but is not a doctor partition.
    #[must_use]
    pub fn classify(name: &str) -> Option<Self> {
        if name == ROOT_PARTITION {
            Some(Self::Root)
        } else if name == DEFAULT_PARTITION {
            Some(Self::Default)
        } else {
            parse_doctor_key(name).map(|key| Self::Doctor(key.to_string()))
        }
    }

    /// Returns `true` for the shared reference-data pool.
    #[must_use]
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }

    /// Returns `true` for the administrative partition.
    #[must_use]
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    /// The doctor key, for doctor-private partitions.
    #[must_use]
    pub fn doctor_key(&self) -> Option<&str> {
        match self {
            Self::Doctor(key) => Some(key),
            _ => None,
        }
    }
}

/// A named tenant partition with its resolved class.
///
/// Invariant: the class is resolved from the name exactly once, before any
/// authorization decision is made against the partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    name: String,
    class: PartitionClass,
}

impl Partition {
    /// Resolve a partition from its name.
    ///
    /// Returns `None` for unrecognized names; callers reject those.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        PartitionClass::classify(name).map(|class| Self {
            name: name.to_string(),
            class,
        })
    }

    /// The shared reference-data partition.
    #[must_use]
    pub fn root() -> Self {
        Self {
            name: ROOT_PARTITION.to_string(),
            class: PartitionClass::Root,
        }
    }

    /// The partition name as addressed by the request.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resolved partition class.
    #[must_use]
    pub fn class(&self) -> &PartitionClass {
        &self.class
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_root() {
        assert_eq!(PartitionClass::classify("root"), Some(PartitionClass::Root));
    }

    #[test]
    fn test_classify_default() {
        assert_eq!(
            PartitionClass::classify("DEFAULT"),
            Some(PartitionClass::Default)
        );
    }

    #[test]
    fn test_classify_doctor() {
        assert_eq!(
            PartitionClass::classify("D57761"),
            Some(PartitionClass::Doctor("57761".to_string()))
        );
        assert_eq!(
            PartitionClass::classify("D666"),
            Some(PartitionClass::Doctor("666".to_string()))
        );
    }

    #[test]
    fn test_classify_is_a_prefix_trim_not_a_parse() {
        // Anything after the marker is the key, digits or not.
        assert_eq!(
            PartitionClass::classify("Dummy"),
            Some(PartitionClass::Doctor("ummy".to_string()))
        );
    }

    #[test]
    fn test_classify_unrecognized() {
        assert_eq!(PartitionClass::classify(""), None);
        assert_eq!(PartitionClass::classify("D"), None);
        assert_eq!(PartitionClass::classify("dummy1"), None);
        assert_eq!(PartitionClass::classify("Root"), None);
        assert_eq!(PartitionClass::classify("default"), None);
    }

    #[test]
    fn test_parse_doctor_key() {
        assert_eq!(parse_doctor_key("D57761"), Some("57761"));
        assert_eq!(parse_doctor_key("D"), None);
        assert_eq!(parse_doctor_key("57761"), None);
        assert_eq!(parse_doctor_key("Dä"), Some("ä"));
    }

    #[test]
    fn test_partition_from_name() {
        let partition = Partition::from_name("D57761").unwrap();
        assert_eq!(partition.name(), "D57761");
        assert_eq!(partition.class().doctor_key(), Some("57761"));

        assert!(Partition::from_name("nope").is_none());
    }

    #[test]
    fn test_partition_root_helper() {
        let root = Partition::root();
        assert_eq!(root.name(), "root");
        assert!(root.class().is_root());
    }
}
