use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the wallet is hosted: inside a native shell with a biometric bridge,
/// or as a plain web client talking to a platform authenticator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    #[default]
    Web,
    Hybrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
    Other,
}

impl Platform {
    pub fn detect() -> Self {
        if cfg!(any(target_os = "ios", target_os = "macos")) {
            Platform::Ios
        } else if cfg!(target_os = "android") {
            Platform::Android
        } else {
            Platform::Other
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::detect()
    }
}

impl fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeMode::Web => write!(f, "web"),
            RuntimeMode::Hybrid => write!(f, "hybrid"),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Ios => write!(f, "ios"),
            Platform::Android => write!(f, "android"),
            Platform::Other => write!(f, "other"),
        }
    }
}

impl FromStr for RuntimeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "web" => Ok(RuntimeMode::Web),
            "hybrid" | "phonegap" => Ok(RuntimeMode::Hybrid),
            _ => Err(format!("Unknown runtime '{}'. Expected web or hybrid", s)),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ios" => Ok(Platform::Ios),
            "android" => Ok(Platform::Android),
            "other" => Ok(Platform::Other),
            _ => Err(format!(
                "Unknown platform '{}'. Expected ios, android or other",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_parse() {
        assert_eq!("web".parse::<RuntimeMode>(), Ok(RuntimeMode::Web));
        assert_eq!("Hybrid".parse::<RuntimeMode>(), Ok(RuntimeMode::Hybrid));
        assert_eq!("phonegap".parse::<RuntimeMode>(), Ok(RuntimeMode::Hybrid));
        assert!("native".parse::<RuntimeMode>().is_err());
    }

    #[test]
    fn test_platform_parse_and_display() {
        for platform in [Platform::Ios, Platform::Android, Platform::Other] {
            assert_eq!(platform.to_string().parse::<Platform>(), Ok(platform));
        }
        assert!("windows".parse::<Platform>().is_err());
    }
}
