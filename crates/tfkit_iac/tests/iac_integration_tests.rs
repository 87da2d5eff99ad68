//! Integration tests for project scaffolding.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::tempdir;

use tfkit_core::{Config, CONFIG_FILE_NAME};
use tfkit_drift::{parse_versions, Baseline, DriftAnalyzer, VersionDetector};
use tfkit_iac::{AppGenerator, IacError, ProjectInitializer};

const CONFIG: &str = r#"
terraform_version: "~> 1.13"
provider:
  aws:
    version: "~> 6.0"
    account_mapping:
      dev: "111111111111"
      prd: "222222222222"
    default_tags:
      managed_by: terraform
    regions: [eu-central-1, us-west-2]
backend:
  s3:
    bucket_name: "tfstate-{{ env }}-{{ short_region }}"
"#;

fn write_config(root: &Path, yaml: &str) -> Config {
    let path = root.join(CONFIG_FILE_NAME);
    fs::write(&path, yaml).unwrap();
    Config::from_file(&path).unwrap()
}

#[test]
fn test_init_with_defaults() {
    let temp = tempdir().unwrap();

    let report = ProjectInitializer::new(temp.path()).init().unwrap();

    for file in [
        ".gitignore",
        ".pre-commit-config.yaml",
        ".tflint.hcl",
        "trivy.yaml",
        ".tfkit.yaml",
    ] {
        assert!(temp.path().join(file).is_file(), "missing {}", file);
    }
    for env in ["dev", "stg", "prd"] {
        let env_dir = temp.path().join("envs").join(env);
        assert_eq!(
            fs::read_to_string(env_dir.join(".terraform-version")).unwrap(),
            "1.13.1\n"
        );
        assert!(env_dir.join("eu-central-1").is_dir());
    }
    assert!(report.created.contains(&PathBuf::from(".tfkit.yaml")));
    assert_eq!(report.created_dirs.len(), 3);
    assert!(report.skipped.is_empty());
}

#[test]
fn test_init_is_idempotent() {
    let temp = tempdir().unwrap();
    ProjectInitializer::new(temp.path()).init().unwrap();

    let second = ProjectInitializer::new(temp.path()).init().unwrap();

    assert!(second.is_unchanged());
    assert!(second.skipped.contains(&PathBuf::from(".gitignore")));
}

#[test]
fn test_init_uses_existing_config() {
    let temp = tempdir().unwrap();
    write_config(temp.path(), CONFIG);

    ProjectInitializer::new(temp.path()).init().unwrap();

    let envs = temp.path().join("envs");
    assert!(envs.join("dev/us-west-2").is_dir());
    assert!(envs.join("prd/eu-central-1").is_dir());
    assert!(!envs.join("stg").exists());
    assert_eq!(
        fs::read_to_string(envs.join("dev/.terraform-version")).unwrap(),
        "1.13.0\n"
    );
    assert_eq!(fs::read_to_string(temp.path().join(CONFIG_FILE_NAME)).unwrap(), CONFIG);
}

#[test]
fn test_init_rejects_config_without_account_mapping() {
    let temp = tempdir().unwrap();
    write_config(temp.path(), "terraform_version: '~> 1.9'\n");

    let err = ProjectInitializer::new(temp.path()).init().unwrap_err();

    assert!(matches!(err, IacError::MissingAccountMapping(_)));
    assert!(!temp.path().join("envs").exists());
}

#[test]
fn test_generate_app() {
    let temp = tempdir().unwrap();
    let config = write_config(temp.path(), CONFIG);

    let report = AppGenerator::new(&config, temp.path())
        .generate("dev", "eu-central-1", "payments")
        .unwrap();

    let app = temp.path().join("envs/dev/eu-central-1/payments");
    for file in [
        "backend.tf",
        "versions.tf",
        "providers.tf",
        "main.tf",
        "variables.tf",
        "outputs.tf",
    ] {
        assert!(app.join(file).is_file(), "missing {}", file);
    }
    assert_eq!(report.created.len(), 6);
    assert!(!temp.path().join(".github").exists());

    let backend = fs::read_to_string(app.join("backend.tf")).unwrap();
    assert!(backend.contains("bucket       = \"tfstate-dev-euc1\""));
    assert!(backend
        .starts_with("## tfkit-metadata: {\"bucket\":\"tfstate-dev-euc1\",\"schema\":\"1\"}"));

    let providers = fs::read_to_string(app.join("providers.tf")).unwrap();
    assert!(providers.contains("allowed_account_ids = [\"111111111111\"]"));
}

#[test]
fn test_generated_versions_file_is_in_sync() {
    let temp = tempdir().unwrap();
    let config = write_config(temp.path(), CONFIG);
    AppGenerator::new(&config, temp.path())
        .generate("prd", "us-west-2", "api")
        .unwrap();

    let content =
        fs::read_to_string(temp.path().join("envs/prd/us-west-2/api/versions.tf")).unwrap();
    let declared = parse_versions(&content).unwrap();
    assert_eq!(declared.terraform_version, "~> 1.13");
    assert_eq!(declared.providers["aws"].version, "~> 6.0");

    let records = VersionDetector::new(temp.path().join("envs")).scan().unwrap();
    let baseline: Baseline = config.baseline();
    let report = DriftAnalyzer::new(baseline).analyze(&temp.path().join("envs"), &records);
    assert_eq!(report.total_files, 1);
    assert!(!report.has_drift());
}

#[test]
fn test_generate_skips_existing_and_refreshes_metadata() {
    let temp = tempdir().unwrap();
    let config = write_config(temp.path(), CONFIG);
    let generator = AppGenerator::new(&config, temp.path());
    generator.generate("dev", "eu-central-1", "payments").unwrap();

    let again = generator.generate("dev", "eu-central-1", "payments").unwrap();
    assert!(again.is_unchanged());
    assert_eq!(again.skipped.len(), 6);

    let bumped = write_config(
        temp.path(),
        &CONFIG
            .replace("\"~> 1.13\"", "\"~> 1.14\"")
            .replace("managed_by: terraform", "managed_by: tfkit"),
    );
    let report = AppGenerator::new(&bumped, temp.path())
        .generate("dev", "eu-central-1", "payments")
        .unwrap();

    assert_eq!(report.updated.len(), 1);
    let update = &report.updated[0];
    assert_eq!(update.path, PathBuf::from("envs/dev/eu-central-1/payments/versions.tf"));
    assert_eq!(
        update.changes,
        vec!["tf_ver changed: ~> 1.13 -> ~> 1.14", "managed_by changed: terraform -> tfkit"]
    );
    let versions =
        fs::read_to_string(temp.path().join("envs/dev/eu-central-1/payments/versions.tf")).unwrap();
    assert!(versions.contains("required_version = \"~> 1.14\""));
    assert!(!report.skipped.contains(&update.path));
}

#[test]
fn test_generate_regenerates_backend_without_metadata() {
    let temp = tempdir().unwrap();
    let config = write_config(temp.path(), CONFIG);
    let app = temp.path().join("envs/dev/eu-central-1/payments");
    fs::create_dir_all(&app).unwrap();
    fs::write(app.join("backend.tf"), "terraform {\n  backend \"s3\" {}\n}\n").unwrap();

    let report = AppGenerator::new(&config, temp.path())
        .generate("dev", "eu-central-1", "payments")
        .unwrap();

    assert_eq!(report.updated.len(), 1);
    assert_eq!(report.updated[0].changes, vec!["metadata record missing"]);
    let backend = fs::read_to_string(app.join("backend.tf")).unwrap();
    assert!(backend.contains("tfstate-dev-euc1"));
}

#[test]
fn test_generate_workflows() {
    let temp = tempdir().unwrap();
    let yaml = format!(
        "{}generate:\n  github_workflows:\n    create: true\n    aws_role_name: deployer\n",
        CONFIG
    );
    let config = write_config(temp.path(), &yaml);

    AppGenerator::new(&config, temp.path())
        .generate("prd", "us-west-2", "api")
        .unwrap();

    let workflows = temp.path().join(".github/workflows");
    assert!(workflows.join("reusable-terraform.yaml").is_file());
    let workflow = fs::read_to_string(workflows.join("api-prd-usw2-terraform.yaml")).unwrap();
    assert!(workflow.contains("arn:aws:iam::222222222222:role/deployer"));
    assert!(workflow.contains(".github/workflows/api-prd-usw2-terraform.yaml"));
}

#[test]
fn test_generate_with_custom_templates() {
    let temp = tempdir().unwrap();
    let custom = temp.path().join("custom");
    fs::create_dir_all(&custom).unwrap();
    fs::write(custom.join("main.tf.tmpl"), "# {{ app_dir }} in {{ env }}\n").unwrap();
    fs::write(custom.join("data.tf.tmpl"), "# extra\n").unwrap();

    let yaml = format!("{}templates_dir: {}\n", CONFIG, custom.display());
    let config = write_config(temp.path(), &yaml);

    AppGenerator::new(&config, temp.path())
        .generate("dev", "eu-central-1", "web")
        .unwrap();

    let app = temp.path().join("envs/dev/eu-central-1/web");
    assert_eq!(fs::read_to_string(app.join("main.tf")).unwrap(), "# web in dev\n");
    assert!(app.join("data.tf").is_file());
}

#[test]
fn test_generate_unknown_environment() {
    let temp = tempdir().unwrap();
    let config = write_config(temp.path(), CONFIG);

    let err = AppGenerator::new(&config, temp.path())
        .generate("stg", "eu-central-1", "payments")
        .unwrap_err();

    assert!(matches!(err, IacError::UnknownEnvironment(env) if env == "stg"));
}

#[test]
fn test_generate_requires_account_mapping() {
    let temp = tempdir().unwrap();
    let config = Config::from_yaml_str("").unwrap();

    let err = AppGenerator::new(&config, temp.path())
        .generate("dev", "eu-central-1", "payments")
        .unwrap_err();

    assert!(matches!(err, IacError::Config(_)));
}
