//! Tests for the model builder, focusing on override merging

use super::*;

fn files(entries: &[(&str, &str)]) -> SourceFiles {
    entries.iter().map(|(name, body)| (name.to_string(), body.to_string())).collect()
}

fn text_of<'a>(resource: &'a Resource, attr: &str) -> &'a str {
    resource.get_token(attr).map(|t| t.text.as_str()).unwrap_or_default()
}

const WEB_INSTANCES: &str = r#"
resource "aws_instance" "web" {
  ami           = "ami-b73b63a0"
  instance_type = "t1.2xlarge" # invalid type!

  tags {
    Name = "HelloWorld"
  }
}

resource "aws_instance" "web2" {
  security_groups = ["sg-1", "sg-2"]
}

resource "aws_instance2" "web" {
  root_block_device = {
    volume_size = "24"
  }
}
"#;

#[cfg(test)]
mod make_tests {
    use super::*;

    #[test]
    fn test_make_single_template() {
        let templates = make(&files(&[("test.tf", WEB_INSTANCES)])).unwrap();

        assert_eq!(templates.len(), 1);
        let template = &templates[0];
        assert_eq!(template.file, "test.tf");
        assert_eq!(template.resources.len(), 3);

        let web = template.find("aws_instance", "web").unwrap();
        assert_eq!(web.file, "test.tf");
        assert_eq!(web.pos, Pos::new("test.tf", 1, 2, 1));

        let ami = web.attribute("ami").unwrap();
        assert_eq!(ami.len(), 1);
        assert_eq!(ami.first().pos, Pos::new("test.tf", 51, 3, 19));
        assert_eq!(
            ami.first().value,
            Value::Scalar(Token::new(
                TokenKind::String,
                "\"ami-b73b63a0\"",
                Pos::new("test.tf", 51, 3, 19)
            ))
        );
        assert_eq!(text_of(web, "instance_type"), "\"t1.2xlarge\"");

        let tags = web.attribute("tags").unwrap();
        assert_eq!(tags.first().pos, Pos::new("test.tf", 116, 6, 3));
        let name = tags.first().value.as_map().unwrap()["Name"].as_scalar().unwrap();
        assert_eq!(name.text, "\"HelloWorld\"");
        assert_eq!(name.pos, Pos::new("test.tf", 134, 7, 12));
    }

    #[test]
    fn test_make_keeps_list_element_positions() {
        let templates = make(&files(&[("test.tf", WEB_INSTANCES)])).unwrap();
        let web2 = templates[0].find("aws_instance", "web2").unwrap();

        let groups = web2.attribute("security_groups").unwrap();
        assert_eq!(groups.first().pos, Pos::new("test.tf", 207, 12, 21));

        let tokens = web2.get_list_tokens("security_groups").unwrap();
        let positions: Vec<_> = tokens.iter().map(|t| (t.text.as_str(), t.pos.offset, t.pos.column)).collect();
        assert_eq!(positions, vec![("\"sg-1\"", 208, 22), ("\"sg-2\"", 216, 30)]);
    }

    #[test]
    fn test_make_object_attribute() {
        let templates = make(&files(&[("test.tf", WEB_INSTANCES)])).unwrap();
        let web = templates[0].find("aws_instance2", "web").unwrap();

        let device = web.get_map("root_block_device").unwrap();
        let size = device["volume_size"].as_scalar().unwrap();
        assert_eq!(size.text, "\"24\"");
        assert_eq!(size.pos.line, 17);
    }

    #[test]
    fn test_repeated_blocks_are_separate_occurrences() {
        let src = r#"
resource "aws_instance" "web" {
  ebs_block_device {
    device_name = "/dev/sdb"
  }
  ebs_block_device {
    device_name = "/dev/sdc"
  }
}
"#;
        let templates = make(&files(&[("main.tf", src)])).unwrap();
        let devices = templates[0].resources[0].attribute("ebs_block_device").unwrap();

        assert_eq!(devices.len(), 2);
        let lines: Vec<_> = devices.occurrences().iter().map(|o| o.pos.line).collect();
        assert_eq!(lines, vec![3, 6]);
    }

    #[test]
    fn test_non_resource_blocks_are_ignored() {
        let src = r#"
provider "aws" {
  region = "us-east-1"
}

variable "ami" {
  default = "ami-1"
}

module "vpc" {
  source = "./vpc"
}

resource "aws_instance" "web" {
  ami = "${var.ami}"
}
"#;
        let configuration = load(&files(&[("main.tf", src)]), &BuildOptions::default()).unwrap();

        assert_eq!(configuration.templates[0].resources.len(), 1);
        assert_eq!(text_of(&configuration.templates[0].resources[0], "ami"), "\"${var.ami}\"");
        assert_eq!(
            configuration.templates[0].resources[0].get_token("ami").unwrap().kind,
            TokenKind::Template
        );
        assert!(configuration.variables.declaration("ami").is_some());
    }

    #[test]
    fn test_templates_follow_lexical_file_order() {
        let templates = make(&files(&[
            ("b.tf", "resource \"x\" \"b\" {}\n"),
            ("a.tf", "resource \"x\" \"a\" {}\n"),
        ]))
        .unwrap();

        let names: Vec<_> = templates.iter().map(|t| t.file.as_str()).collect();
        assert_eq!(names, vec!["a.tf", "b.tf"]);
    }

    #[test]
    fn test_make_is_idempotent() {
        let input = files(&[
            ("test.tf", WEB_INSTANCES),
            ("test_override.tf", "resource \"aws_instance\" \"web\" {\n  ami = \"ami-2\"\n}\n"),
        ]);
        assert_eq!(make(&input).unwrap(), make(&input).unwrap());
    }
}

#[cfg(test)]
mod parse_error_tests {
    use super::*;

    #[test]
    fn test_syntax_error_aborts_build() {
        let err = make(&files(&[
            ("good.tf", "resource \"x\" \"a\" {}\n"),
            ("bad.tf", "resource \"x\" \"b\" {\n  attr = \n"),
        ]))
        .unwrap_err();

        assert_eq!(err.file, "bad.tf");
        assert!(err.line >= 2);
    }

    #[test]
    fn test_resource_requires_two_labels() {
        let err = make(&files(&[("main.tf", "\nresource \"aws_instance\" {\n}\n")])).unwrap_err();
        assert_eq!(err.file, "main.tf");
        assert_eq!(err.line, 2);
        assert!(err.message.contains("2 labels"));
    }

    #[test]
    fn test_duplicate_resource_in_one_file() {
        let src = "resource \"x\" \"a\" {}\nresource \"x\" \"a\" {}\n";
        let err = make(&files(&[("main.tf", src)])).unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("duplicate"));
    }
}

#[cfg(test)]
mod override_tests {
    use super::*;

    const BASE: &str = r#"
resource "aws_instance" "web" {
  ami           = "ami-b73b63a0"
  instance_type = "t1.2xlarge" # invalid type!

  tags {
    Name = "HelloWorld"
  }
}
"#;

    const SPECIFIC_OVERRIDE: &str = r#"
resource "aws_instance" "web" {
  ami           = "ami-override"
  instance_type = "t2.nano"

  tags {
    Version = "0.1"
  }
}
"#;

    const GLOBAL_OVERRIDE: &str = r#"
resource "aws_instance" "web" {
  instance_type = "t2.micro"
}
"#;

    #[test]
    fn test_file_roles() {
        assert!(is_override_file("override.tf"));
        assert!(is_override_file("main_override.tf"));
        assert!(is_override_file("network/override.tf"));
        assert!(!is_override_file("main.tf"));
        assert!(!is_override_file("overrides.tf"));

        assert_eq!(file_role("a_override.tf"), FileRole::Override { base: Some("a.tf".into()) });
        assert_eq!(file_role("override.tf"), FileRole::Override { base: None });
    }

    #[test]
    fn test_override_replaces_attributes() {
        let templates = make(&files(&[
            ("a.tf", "resource \"x\" \"id\" {\n  attr = \"1\"\n  keep = \"k\"\n}\n"),
            ("a_override.tf", "resource \"x\" \"id\" {\n  attr = \"2\"\n}\n"),
        ]))
        .unwrap();

        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].file, "a.tf");
        assert_eq!(templates[0].resources.len(), 1);

        let resource = &templates[0].resources[0];
        assert_eq!(resource.key(), ("x", "id"));
        assert_eq!(text_of(resource, "attr"), "\"2\"");
        assert_eq!(resource.attribute("attr").unwrap().first().pos.filename, "a_override.tf");
        assert_eq!(text_of(resource, "keep"), "\"k\"");
        assert_eq!(resource.pos, Pos::new("a.tf", 0, 1, 1));
        assert_eq!(resource.file, "a.tf");
    }

    #[test]
    fn test_override_replaces_nested_block_wholesale() {
        let templates = make(&files(&[
            ("test.tf", BASE),
            ("test_override.tf", SPECIFIC_OVERRIDE),
            ("override.tf", GLOBAL_OVERRIDE),
        ]))
        .unwrap();

        assert_eq!(templates.len(), 1);
        let web = &templates[0].resources[0];
        assert_eq!(web.pos, Pos::new("test.tf", 1, 2, 1));
        assert_eq!(text_of(web, "ami"), "\"ami-override\"");
        assert_eq!(text_of(web, "instance_type"), "\"t2.nano\"");

        let tags = web.get_map("tags").unwrap();
        assert!(tags.get("Name").is_none());
        assert_eq!(tags["Version"].as_scalar().unwrap().pos, Pos::new("test_override.tf", 118, 7, 15));
        assert_eq!(web.attribute("tags").unwrap().first().pos.filename, "test_override.tf");
    }

    #[test]
    fn test_precedence_modes() {
        let input = files(&[
            ("a.tf", "resource \"x\" \"id\" {\n  attr = \"base\"\n}\n"),
            ("a_override.tf", "resource \"x\" \"id\" {\n  attr = \"specific\"\n}\n"),
            ("override.tf", "resource \"x\" \"id\" {\n  attr = \"global\"\n}\n"),
        ]);

        let lexical = load(&input, &BuildOptions::default()).unwrap();
        assert_eq!(text_of(&lexical.templates[0].resources[0], "attr"), "\"global\"");

        let options = BuildOptions { override_precedence: OverridePrecedence::SpecificLast };
        let specific = load(&input, &options).unwrap();
        assert_eq!(text_of(&specific.templates[0].resources[0], "attr"), "\"specific\"");
    }

    #[test]
    fn test_override_without_base_resource_is_inserted() {
        let templates = make(&files(&[
            ("a.tf", "resource \"x\" \"one\" {}\n"),
            ("a_override.tf", "resource \"x\" \"two\" {\n  attr = \"2\"\n}\n"),
        ]))
        .unwrap();

        assert_eq!(templates.len(), 1);
        let keys: Vec<_> = templates[0].resources.iter().map(Resource::key).collect();
        assert_eq!(keys, vec![("x", "one"), ("x", "two")]);
        assert_eq!(templates[0].resources[1].file, "a_override.tf");
    }

    #[test]
    fn test_override_without_base_file_gets_own_template() {
        let templates = make(&files(&[
            ("main.tf", "resource \"x\" \"one\" {}\n"),
            ("override.tf", "resource \"x\" \"two\" {}\n"),
            ("orphan_override.tf", "resource \"x\" \"three\" {}\n"),
        ]))
        .unwrap();

        let names: Vec<_> = templates.iter().map(|t| t.file.as_str()).collect();
        assert_eq!(names, vec!["main.tf", "orphan_override.tf", "override.tf"]);
        assert_eq!(templates[0].resources.len(), 1);
    }

    #[test]
    fn test_override_targets_resource_in_any_base_file() {
        let templates = make(&files(&[
            ("compute.tf", "resource \"aws_instance\" \"web\" {\n  ami = \"a\"\n}\n"),
            ("network.tf", "resource \"aws_vpc\" \"main\" {}\n"),
            ("override.tf", "resource \"aws_instance\" \"web\" {\n  ami = \"b\"\n}\n"),
        ]))
        .unwrap();

        assert_eq!(templates.len(), 2);
        assert_eq!(text_of(&templates[0].resources[0], "ami"), "\"b\"");
        assert_eq!(templates[1].resources.len(), 1);
    }

    #[test]
    fn test_no_duplicate_keys_after_merge() {
        let templates = make(&files(&[
            ("a.tf", "resource \"x\" \"id\" {}\nresource \"y\" \"id\" {}\n"),
            ("a_override.tf", "resource \"x\" \"id\" {\n  v = 1\n}\n"),
            ("override.tf", "resource \"x\" \"id\" {\n  v = 2\n}\nresource \"y\" \"id\" {}\n"),
        ]))
        .unwrap();

        for template in &templates {
            let mut keys: Vec<_> = template.resources.iter().map(Resource::key).collect();
            let count = keys.len();
            keys.sort();
            keys.dedup();
            assert_eq!(keys.len(), count);
        }
    }

    #[test]
    fn test_override_variables_replace_declarations() {
        let configuration = load(
            &files(&[
                ("variables.tf", "variable \"ami\" {\n  default = \"ami-1\"\n}\n"),
                ("variables_override.tf", "variable \"ami\" {\n  default = \"ami-2\"\n}\n"),
            ]),
            &BuildOptions::default(),
        )
        .unwrap();

        let value = configuration.variables.get("ami").unwrap().as_scalar().unwrap();
        assert_eq!(value.text, "\"ami-2\"");
    }
}
