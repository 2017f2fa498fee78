use crate::errors::DomainError;
use std::fmt;
use std::str::FromStr;

/// Longest label the wire format can carry (6-bit length field).
pub const MAX_LABEL_LEN: usize = 63;

/// Longest encoded name, terminal zero included.
pub const MAX_NAME_WIRE_LEN: usize = 255;

/// A domain name as an ordered sequence of labels.
///
/// Labels are stored least-significant first (`bupt.edu.cn` is kept as
/// `[cn, edu, bupt]`), so that suffix comparison between two names is a
/// prefix walk over their label vectors. Labels are opaque octets and are
/// compared byte-exact; UTF-8 is permitted but not required.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainName {
    labels: Vec<Vec<u8>>,
}

impl DomainName {
    /// Builds a name from labels in wire order (most-significant first).
    pub fn from_wire_labels(labels: Vec<Vec<u8>>) -> Result<Self, DomainError> {
        let mut reversed = labels;
        reversed.reverse();
        Self::from_suffix_labels(reversed)
    }

    /// Builds a name from labels already in suffix-first order.
    pub fn from_suffix_labels(labels: Vec<Vec<u8>>) -> Result<Self, DomainError> {
        if labels.is_empty() {
            return Err(DomainError::InvalidDomainName("empty name".to_string()));
        }
        let mut wire_len = 1;
        for label in &labels {
            if label.is_empty() {
                return Err(DomainError::InvalidDomainName("empty label".to_string()));
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(DomainError::InvalidDomainName(format!(
                    "label longer than {} bytes",
                    MAX_LABEL_LEN
                )));
            }
            wire_len += 1 + label.len();
        }
        if wire_len > MAX_NAME_WIRE_LEN {
            return Err(DomainError::InvalidDomainName(format!(
                "name longer than {} bytes on the wire",
                MAX_NAME_WIRE_LEN
            )));
        }
        Ok(Self { labels })
    }

    /// Labels in suffix-first order (top-level label at index 0).
    pub fn labels(&self) -> &[Vec<u8>] {
        &self.labels
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    /// Labels in wire order (most-significant first).
    pub fn wire_labels(&self) -> impl Iterator<Item = &[u8]> {
        self.labels.iter().rev().map(Vec::as_slice)
    }

    /// Encoded length: one length byte per label plus the terminal zero.
    pub fn wire_len(&self) -> usize {
        self.labels.iter().map(|l| 1 + l.len()).sum::<usize>() + 1
    }

    /// Number of labels this name shares with `other`, counted from the
    /// top-level label down.
    pub fn common_suffix_labels(&self, other: &DomainName) -> usize {
        self.labels
            .iter()
            .zip(other.labels.iter())
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// True when every label of `self` matches the tail of `other`.
    pub fn is_suffix_of(&self, other: &DomainName) -> bool {
        self.label_count() <= other.label_count()
            && self.common_suffix_labels(other) == self.label_count()
    }
}

/// The hard-coded root the local role falls back to when the authority file
/// has no delegation for a task.
pub fn root_fallback_name() -> DomainName {
    DomainName {
        labels: vec!["网络".as_bytes().to_vec(), "根".as_bytes().to_vec()],
    }
}

impl FromStr for DomainName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(DomainError::InvalidDomainName("empty name".to_string()));
        }
        let mut labels: Vec<Vec<u8>> = s.split('.').map(|l| l.as_bytes().to_vec()).collect();
        labels.reverse();
        Self::from_suffix_labels(labels)
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, label) in self.labels.iter().rev().enumerate() {
            if i != 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", String::from_utf8_lossy(label))?;
        }
        Ok(())
    }
}
