use std::collections::HashSet;

use crate::detector::{BuiltinDetector, Detector, DetectorContext, DetectorId};
use crate::errors::ExternalStateError;
use crate::issue::{IssueSink, IssueType};
use crate::schema::Resource;

use super::report_unknown_elements;

/// Checks that every `aws_elb.subnets` entry exists in the account
#[derive(Debug, Default)]
pub struct AwsElbInvalidSubnet {
    subnets: HashSet<String>,
}

impl Detector for AwsElbInvalidSubnet {
    fn id(&self) -> DetectorId {
        BuiltinDetector::AwsElbInvalidSubnet.into()
    }

    fn target_resource_type(&self) -> &str {
        "aws_elb"
    }

    fn severity(&self) -> IssueType {
        IssueType::Error
    }

    fn requires_deep_check(&self) -> bool {
        true
    }

    fn pre_process(&mut self, context: &DetectorContext) -> Result<(), ExternalStateError> {
        self.subnets = context.cloud()?.describe_subnets()?.into_iter().collect();
        Ok(())
    }

    fn detect(&self, resource: &Resource, context: &DetectorContext, issues: &mut IssueSink) {
        report_unknown_elements(&self.id(), resource, "subnets", &self.subnets, context, issues, |subnet| {
            format!("\"{}\" is invalid subnet ID.", subnet)
        });
    }
}
