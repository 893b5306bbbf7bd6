use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

const UNIT: &str = "mins";

/// Movie running time in whole minutes.
///
/// Its textual form (and JSON representation) is `"<minutes> mins"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Runtime(i32);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid runtime format: {0:?}")]
pub struct InvalidRuntimeFormat(String);

impl Runtime {
    pub const fn new(minutes: i32) -> Self {
        Runtime(minutes)
    }

    pub const fn minutes(self) -> i32 {
        self.0
    }
}

impl From<i32> for Runtime {
    fn from(value: i32) -> Self {
        Runtime(value)
    }
}

impl Display for Runtime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {UNIT}", self.0)
    }
}

impl FromStr for Runtime {
    type Err = InvalidRuntimeFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidRuntimeFormat(s.to_string());
        let (minutes, unit) = s.split_once(' ').ok_or_else(invalid)?;
        if unit != UNIT {
            return Err(invalid());
        }
        minutes.parse::<i32>().map(Runtime).map_err(|_| invalid())
    }
}

impl Serialize for Runtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Runtime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use super::*;

    #[quickcheck]
    fn test_runtime_text_form(minutes: i32) -> bool {
        let runtime = Runtime::new(minutes);
        runtime.to_string().parse::<Runtime>() == Ok(runtime)
    }

    #[test]
    fn test_json() {
        let json = serde_json::to_string(&Runtime::new(102)).unwrap();
        assert_eq!(r#""102 mins""#, json);
        let runtime: Runtime = serde_json::from_str(r#""95 mins""#).unwrap();
        assert_eq!(95, runtime.minutes());
    }

    #[test]
    fn test_invalid_formats() {
        for s in ["102", "102 minutes", "abc mins", "102  mins", " mins", ""] {
            assert!(s.parse::<Runtime>().is_err(), "{s:?} should not parse");
        }
        assert!(serde_json::from_str::<Runtime>("102").is_err());
    }
}
