//! End-to-end runs: source files in, issues out

use crate::cloud::{Snapshot, SnapshotClient};
use crate::detector::{BuiltinDetector, DetectorContext, DetectorId, DetectorRegistry, DetectorState, RunOptions, RunReport};
use crate::eval::Evaluator;
use crate::issue::IssueType;
use crate::schema::{load, BuildOptions, Configuration, SourceFiles};

const MAIN: &str = r#"variable "subnets" {
  default = ["subnet-1234abcd", "subnet-00000000"]
}

variable "unit" {
  default = "Seconds"
}

resource "aws_instance" "web" {
  ami           = "ami-b73b63a0"
  instance_type = "t1.micro"
}

resource "aws_cloudwatch_metric_alarm" "cpu" {
  alarm_name = "cpu"
  unit       = "${var.unit}"
}

resource "aws_elb" "balancer" {
  subnets = "${var.subnets}"
}

resource "aws_alb" "balancer" {
  security_groups = ["sg-1234abcd", "sg-00000000"]
}
"#;

fn files(entries: &[(&str, &str)]) -> SourceFiles {
    entries.iter().map(|(name, body)| (name.to_string(), body.to_string())).collect()
}

fn snapshot() -> SnapshotClient {
    SnapshotClient::from_snapshot(Snapshot {
        security_groups: vec!["sg-1234abcd".into()],
        subnets: vec!["subnet-1234abcd".into()],
    })
}

fn lint(configuration: &Configuration, cloud: Option<&SnapshotClient>, options: &RunOptions) -> RunReport {
    let mut context = DetectorContext::new(Evaluator::new(&configuration.variables));
    if let Some(client) = cloud {
        context = context.with_cloud(client);
    }
    DetectorRegistry::with_defaults().run(&configuration.templates, &context, options)
}

fn summary(report: &RunReport) -> Vec<(IssueType, String, String, usize)> {
    report
        .issues
        .iter()
        .map(|i| (i.issue_type, i.message.clone(), i.file.clone(), i.line))
        .collect()
}

#[test]
fn test_full_run_with_deep_check() {
    let configuration = load(&files(&[("main.tf", MAIN)]), &BuildOptions::default()).unwrap();
    let client = snapshot();

    let report = lint(&configuration, Some(&client), &RunOptions::default().deep(true));

    assert_eq!(
        summary(&report),
        vec![
            (IssueType::Warning, "\"t1.micro\" is previous generation instance type.".into(), "main.tf".into(), 11),
            (IssueType::Error, "\"subnet-00000000\" is invalid subnet ID.".into(), "main.tf".into(), 20),
            (IssueType::Error, "\"sg-00000000\" is invalid security group.".into(), "main.tf".into(), 24),
        ]
    );
    assert!(report.states.iter().all(|(_, state)| *state == DetectorState::Done));
}

#[test]
fn test_deep_detectors_skipped_by_default() {
    let configuration = load(&files(&[("main.tf", MAIN)]), &BuildOptions::default()).unwrap();

    let report = lint(&configuration, None, &RunOptions::default());

    assert_eq!(report.issues.len(), 1);
    assert_eq!(
        report.state_of(&BuiltinDetector::AwsElbInvalidSubnet.into()),
        Some(&DetectorState::Skipped("requires deep check".into()))
    );
}

#[test]
fn test_deep_check_fails_closed_without_cloud_state() {
    let configuration = load(&files(&[("main.tf", MAIN)]), &BuildOptions::default()).unwrap();

    let report = lint(&configuration, None, &RunOptions::default().deep(true));

    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].detector, DetectorId::from(BuiltinDetector::AwsInstancePreviousType));
    for deep in [BuiltinDetector::AwsElbInvalidSubnet, BuiltinDetector::AwsAlbInvalidSecurityGroup] {
        assert!(matches!(report.state_of(&deep.into()), Some(DetectorState::PreProcessFailed(_))));
    }
    assert_eq!(
        report.state_of(&BuiltinDetector::AwsCloudwatchMetricAlarmInvalidUnit.into()),
        Some(&DetectorState::Done)
    );
}

#[test]
fn test_ignored_detector() {
    let configuration = load(&files(&[("main.tf", MAIN)]), &BuildOptions::default()).unwrap();
    let options = RunOptions::default().ignore(BuiltinDetector::AwsInstancePreviousType);

    let report = lint(&configuration, None, &options);

    assert!(report.issues.is_empty());
}

#[test]
fn test_variable_assignments_change_findings() {
    let mut configuration = load(&files(&[("main.tf", MAIN)]), &BuildOptions::default()).unwrap();
    configuration
        .variables
        .load_var_file("prod.tfvars", "unit = \"Secs\"\nsubnets = [\"subnet-1234abcd\"]\n")
        .unwrap();
    let client = snapshot();

    let report = lint(&configuration, Some(&client), &RunOptions::default().deep(true));
    let messages: Vec<_> = report.issues.iter().map(|i| i.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "\"t1.micro\" is previous generation instance type.",
            "\"Secs\" is invalid unit.",
            "\"sg-00000000\" is invalid security group.",
        ]
    );

    configuration.variables.assign("unit", "Percent");
    let report = lint(&configuration, Some(&client), &RunOptions::default().deep(true));
    assert!(report.issues.iter().all(|i| !i.message.contains("unit")));
}

#[test]
fn test_issue_reported_in_override_file() {
    let base = r#"resource "aws_instance" "web" {
  ami           = "ami-b73b63a0"
  instance_type = "t2.micro"

  tags {
    Name = "HelloWorld"
  }
}
"#;
    let global = r#"resource "aws_instance" "web" {
  instance_type = "t2.nano"
}
"#;
    let specific = r#"resource "aws_instance" "web" {

  instance_type = "m1.small"
  tags {
    Version = "1"
  }
}
"#;
    let sources = files(&[("test.tf", base), ("override.tf", global), ("test_override.tf", specific)]);
    let configuration = load(&sources, &BuildOptions::default()).unwrap();

    let report = lint(&configuration, None, &RunOptions::default());

    assert_eq!(
        summary(&report),
        vec![(
            IssueType::Warning,
            "\"m1.small\" is previous generation instance type.".into(),
            "test_override.tf".into(),
            3
        )]
    );
}

#[test]
fn test_runs_are_idempotent() {
    let sources = files(&[("main.tf", MAIN), ("main_override.tf", "resource \"aws_instance\" \"web\" {\n  instance_type = \"m1.large\"\n}\n")]);
    let client = snapshot();
    let options = RunOptions::default().deep(true);

    let first = load(&sources, &BuildOptions::default()).unwrap();
    let second = load(&sources, &BuildOptions::default()).unwrap();
    assert_eq!(first, second);

    let first_report = lint(&first, Some(&client), &options);
    let second_report = lint(&second, Some(&client), &options);
    assert_eq!(summary(&first_report), summary(&second_report));
    assert_eq!(first_report.issues[0].file, "main_override.tf");
}

#[test]
fn test_parse_error_aborts() {
    let sources = files(&[("main.tf", MAIN), ("broken.tf", "resource \"aws_instance\" {\n")]);

    let err = load(&sources, &BuildOptions::default()).unwrap_err();

    assert_eq!(err.file, "broken.tf");
}
