//! Built-in detectors

mod alb_invalid_security_group;
mod cloudwatch_invalid_unit;
mod elb_invalid_subnet;
mod instance_previous_type;

use std::collections::HashSet;

use log::{debug, warn};

use super::{Detector, DetectorContext, DetectorId};
use crate::errors::UnresolvableReference;
use crate::issue::IssueSink;
use crate::schema::{Resource, Token};

pub use alb_invalid_security_group::AwsAlbInvalidSecurityGroup;
pub use cloudwatch_invalid_unit::AwsCloudwatchMetricAlarmInvalidUnit;
pub use elb_invalid_subnet::AwsElbInvalidSubnet;
pub use instance_previous_type::AwsInstancePreviousType;

/// Every built-in detector, in the order they run
pub fn builtin_detectors() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(AwsInstancePreviousType),
        Box::new(AwsCloudwatchMetricAlarmInvalidUnit),
        Box::new(AwsElbInvalidSubnet::default()),
        Box::new(AwsAlbInvalidSecurityGroup::default()),
    ]
}

/// Log a value that could not be evaluated. The value is skipped.
fn skip_unresolvable(id: &DetectorId, token: &Token, error: &UnresolvableReference) {
    debug!("{}: skipping value at {}: {}", id, token.pos, error);
}

/// Report every element of list attribute `name` missing from `known`.
///
/// Literal list elements are reported at their own position, elements
/// reached through a variable at the attribute's position.
fn report_unknown_elements(
    id: &DetectorId,
    resource: &Resource,
    name: &str,
    known: &HashSet<String>,
    context: &DetectorContext,
    issues: &mut IssueSink,
    message: impl Fn(&str) -> String,
) {
    let Some(attribute) = resource.attribute(name) else {
        return;
    };

    let tokens = match context.evaluator.resolve_list_attribute(attribute) {
        Ok(tokens) => tokens,
        Err(e) => {
            warn!("{}: cannot evaluate {}.{}.{}: {}", id, resource.resource_type, resource.id, name, e);
            return;
        }
    };

    for token in &tokens {
        match context.evaluator.resolve_scalar(token) {
            Ok(value) if !known.contains(&value) => issues.emit(&token.pos, message(&value)),
            Ok(_) => {}
            Err(e) => skip_unresolvable(id, token, &e),
        }
    }
}
