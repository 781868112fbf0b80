//! Type-safe detector identification
//!
//! Built-in detectors are named by [`BuiltinDetector`]; detectors registered
//! from outside the crate carry a free-form name.

use std::fmt;

use serde::{Serialize, Serializer};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Detectors shipped with tfcheck
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    Display,
    EnumString,
    IntoStaticStr,
    EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum BuiltinDetector {
    AwsInstancePreviousType,
    AwsCloudwatchMetricAlarmInvalidUnit,
    AwsElbInvalidSubnet,
    AwsAlbInvalidSecurityGroup,
}

impl BuiltinDetector {
    /// Human-readable description of what the detector checks
    pub const fn description(&self) -> &'static str {
        use BuiltinDetector::*;
        match self {
            AwsInstancePreviousType => "Warns about previous generation EC2 instance types",
            AwsCloudwatchMetricAlarmInvalidUnit => "Checks that metric alarm units are valid CloudWatch units",
            AwsElbInvalidSubnet => "Checks that load balancer subnets exist in the account",
            AwsAlbInvalidSecurityGroup => "Checks that load balancer security groups exist in the account",
        }
    }
}

/// Identifier of a registered detector
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DetectorId {
    Builtin(BuiltinDetector),
    Custom(String),
}

impl DetectorId {
    pub fn as_str(&self) -> &str {
        match self {
            DetectorId::Builtin(id) => id.as_ref(),
            DetectorId::Custom(name) => name.as_str(),
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, DetectorId::Builtin(_))
    }

    /// Parse a name given in configuration or on the command line
    pub fn parse(name: &str) -> Self {
        name.parse::<BuiltinDetector>()
            .map(DetectorId::Builtin)
            .unwrap_or_else(|_| DetectorId::Custom(name.to_string()))
    }
}

impl fmt::Display for DetectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<BuiltinDetector> for DetectorId {
    fn from(id: BuiltinDetector) -> Self {
        DetectorId::Builtin(id)
    }
}

impl AsRef<str> for DetectorId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Serialize for DetectorId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
