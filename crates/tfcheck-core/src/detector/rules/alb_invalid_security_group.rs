use std::collections::HashSet;

use crate::detector::{BuiltinDetector, Detector, DetectorContext, DetectorId};
use crate::errors::ExternalStateError;
use crate::issue::{IssueSink, IssueType};
use crate::schema::Resource;

use super::report_unknown_elements;

/// Checks that every `aws_alb.security_groups` entry exists in the account
#[derive(Debug, Default)]
pub struct AwsAlbInvalidSecurityGroup {
    security_groups: HashSet<String>,
}

impl Detector for AwsAlbInvalidSecurityGroup {
    fn id(&self) -> DetectorId {
        BuiltinDetector::AwsAlbInvalidSecurityGroup.into()
    }

    fn target_resource_type(&self) -> &str {
        "aws_alb"
    }

    fn severity(&self) -> IssueType {
        IssueType::Error
    }

    fn requires_deep_check(&self) -> bool {
        true
    }

    fn pre_process(&mut self, context: &DetectorContext) -> Result<(), ExternalStateError> {
        self.security_groups = context.cloud()?.describe_security_groups()?.into_iter().collect();
        Ok(())
    }

    fn detect(&self, resource: &Resource, context: &DetectorContext, issues: &mut IssueSink) {
        report_unknown_elements(
            &self.id(),
            resource,
            "security_groups",
            &self.security_groups,
            context,
            issues,
            |group| format!("\"{}\" is invalid security group.", group),
        );
    }
}
