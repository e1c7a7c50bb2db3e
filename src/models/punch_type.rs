use serde::{Deserialize, Serialize};

/// Direction of a punch.
///
/// Serialized as `"IN"` / `"OUT"`, which is also the wire format of the
/// remote punch API. Older stored buffers may contain `"In"` / `"Out"`,
/// which are accepted on read.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PunchType {
    #[serde(rename = "IN", alias = "In", alias = "in")]
    In,
    #[serde(rename = "OUT", alias = "Out", alias = "out")]
    Out,
}

impl PunchType {
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "in" => Some(Self::In),
            "out" => Some(Self::Out),
            _ => None,
        }
    }

    /// Wire / display string
    pub fn as_str(&self) -> &'static str {
        match self {
            PunchType::In => "IN",
            PunchType::Out => "OUT",
        }
    }

    pub fn is_in(&self) -> bool {
        matches!(self, PunchType::In)
    }
}

impl std::fmt::Display for PunchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
