use crate::detector::{BuiltinDetector, Detector, DetectorContext, DetectorId};
use crate::issue::{IssueSink, IssueType};
use crate::schema::Resource;

use super::skip_unresolvable;

const PREVIOUS_GENERATION_TYPES: &[&str] = &[
    "t1.micro",
    "m1.small",
    "m1.medium",
    "m1.large",
    "m1.xlarge",
    "c1.medium",
    "c1.xlarge",
    "cc2.8xlarge",
    "cg1.4xlarge",
    "m2.xlarge",
    "m2.2xlarge",
    "m2.4xlarge",
    "cr1.8xlarge",
    "hi1.4xlarge",
    "hs1.8xlarge",
];

/// Warns when `aws_instance.instance_type` is a previous generation type
pub struct AwsInstancePreviousType;

impl Detector for AwsInstancePreviousType {
    fn id(&self) -> DetectorId {
        BuiltinDetector::AwsInstancePreviousType.into()
    }

    fn target_resource_type(&self) -> &str {
        "aws_instance"
    }

    fn severity(&self) -> IssueType {
        IssueType::Warning
    }

    fn detect(&self, resource: &Resource, context: &DetectorContext, issues: &mut IssueSink) {
        let Some(token) = resource.get_token("instance_type") else {
            return;
        };

        match context.evaluator.resolve_scalar(token) {
            Ok(instance_type) if PREVIOUS_GENERATION_TYPES.contains(&instance_type.as_str()) => {
                issues.emit(
                    &token.pos,
                    format!("\"{}\" is previous generation instance type.", instance_type),
                );
            }
            Ok(_) => {}
            Err(e) => skip_unresolvable(&self.id(), token, &e),
        }
    }
}
