use crate::detector::{BuiltinDetector, Detector, DetectorContext, DetectorId};
use crate::issue::{IssueSink, IssueType};
use crate::schema::Resource;

use super::skip_unresolvable;

const VALID_UNITS: &[&str] = &[
    "Seconds",
    "Microseconds",
    "Milliseconds",
    "Bytes",
    "Kilobytes",
    "Megabytes",
    "Gigabytes",
    "Terabytes",
    "Bits",
    "Kilobits",
    "Megabits",
    "Gigabits",
    "Terabits",
    "Percent",
    "Count",
    "Bytes/Second",
    "Kilobytes/Second",
    "Megabytes/Second",
    "Gigabytes/Second",
    "Terabytes/Second",
    "Bits/Second",
    "Kilobits/Second",
    "Megabits/Second",
    "Gigabits/Second",
    "Terabits/Second",
    "Count/Second",
    "None",
];

/// Checks `aws_cloudwatch_metric_alarm.unit` against the CloudWatch units
pub struct AwsCloudwatchMetricAlarmInvalidUnit;

impl Detector for AwsCloudwatchMetricAlarmInvalidUnit {
    fn id(&self) -> DetectorId {
        BuiltinDetector::AwsCloudwatchMetricAlarmInvalidUnit.into()
    }

    fn target_resource_type(&self) -> &str {
        "aws_cloudwatch_metric_alarm"
    }

    fn severity(&self) -> IssueType {
        IssueType::Error
    }

    fn detect(&self, resource: &Resource, context: &DetectorContext, issues: &mut IssueSink) {
        let Some(token) = resource.get_token("unit") else {
            return;
        };

        match context.evaluator.resolve_scalar(token) {
            Ok(unit) if !VALID_UNITS.contains(&unit.as_str()) => {
                issues.emit(&token.pos, format!("\"{}\" is invalid unit.", unit));
            }
            Ok(_) => {}
            Err(e) => skip_unresolvable(&self.id(), token, &e),
        }
    }
}
