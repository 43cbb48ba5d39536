use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Memory amount written as `<n>GB` in the job specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MemorySize {
    gb: u32,
}

impl MemorySize {
    pub const fn gb(gb: u32) -> Self {
        Self { gb }
    }

    pub fn as_gb(&self) -> u32 {
        self.gb
    }
}

impl fmt::Display for MemorySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}GB", self.gb)
    }
}

impl FromStr for MemorySize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .trim()
            .strip_suffix("GB")
            .ok_or_else(|| format!("memory size '{}' must end with GB", s))?;
        digits
            .trim()
            .parse::<u32>()
            .map(MemorySize::gb)
            .map_err(|e| format!("invalid memory size '{}': {}", s, e))
    }
}

impl Serialize for MemorySize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MemorySize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        assert_eq!(MemorySize::gb(80).to_string(), "80GB");
        assert_eq!("512GB".parse::<MemorySize>().unwrap(), MemorySize::gb(512));
        assert!("512".parse::<MemorySize>().is_err());
        assert!("lotsGB".parse::<MemorySize>().is_err());
    }
}
