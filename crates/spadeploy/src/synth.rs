//! Writes composed templates to the output directory.

use std::path::{Path, PathBuf};

use spadeploy_core::config::EnvironmentConfig;
use spadeploy_core::deploy::template_path;
use spadeploy_core::template::{self, ComposeError, StackTemplate};

use crate::prelude::*;

/// Both templates a deploy submits, composed up front.
#[derive(Debug, Clone)]
pub struct Synthesized {
    pub stack_name: String,
    pub stack: StackTemplate,
    pub toolkit_stack_name: String,
    pub toolkit: StackTemplate,
}

/// Composes the hosting and toolkit stacks. Fails before any external call.
pub fn synthesize(config: &EnvironmentConfig) -> template::Result<Synthesized> {
    let composed = template::compose(config)?;
    Ok(Synthesized {
        stack_name: composed.stack_name,
        stack: composed.template,
        toolkit_stack_name: template::naming::toolkit_stack_name(config),
        toolkit: template::compose_toolkit(config)?,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Writes `template` to `<out_dir>/<stack_name>.template.json`.
pub fn write_template(
    out_dir: &Path,
    stack_name: &str,
    template: &StackTemplate,
) -> Result<PathBuf, WriteError> {
    let path = template_path(out_dir, stack_name);
    let mut rendered = template.to_json_pretty()?;
    rendered.push('\n');

    std::fs::create_dir_all(out_dir)
        .and_then(|()| std::fs::write(&path, rendered))
        .map_err(|source| WriteError::Io {
            path: path.clone(),
            source,
        })?;

    tracing::debug!(path = %path.display(), "wrote template");
    Ok(path)
}

/// `deploy synth`: compose and write both templates, nothing else.
pub fn run(config: &EnvironmentConfig, out_dir: &Path, global: &crate::Global) -> anyhow::Result<()> {
    let synthesized = synthesize(config)?;
    let stack = write_template(out_dir, &synthesized.stack_name, &synthesized.stack)?;
    let toolkit = write_template(
        out_dir,
        &synthesized.toolkit_stack_name,
        &synthesized.toolkit,
    )?;

    if !global.is_silent() {
        aprintln!(
            "{} {} ({} resources)",
            p_g("Synthesized"),
            stack.display(),
            synthesized.stack.resources.len()
        );
        aprintln!(
            "{} {} ({} resources)",
            p_g("Synthesized"),
            toolkit.display(),
            synthesized.toolkit.resources.len()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use spadeploy_core::config::{parse, EnvironmentName};

    const DEV: &str = r#"{
        "environment": "dev",
        "account": "210987654321",
        "region": "us-east-1",
        "project": "material-dashboard",
        "cloudfront": { "priceClass": "PriceClass_100" }
    }"#;

    fn dev_config() -> EnvironmentConfig {
        parse(Path::new("dev.json"), DEV, EnvironmentName::Dev).unwrap()
    }

    #[test]
    fn test_write_template_is_byte_stable() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("infra.out");
        let synthesized = synthesize(&dev_config()).unwrap();

        let path = write_template(&out, &synthesized.stack_name, &synthesized.stack).unwrap();
        let first = std::fs::read(&path).unwrap();
        let again = synthesize(&dev_config()).unwrap();
        write_template(&out, &again.stack_name, &again.stack).unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(path, out.join("MaterialDashboard-Dev.template.json"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_synthesize_fails_on_domain_without_certificate() {
        let mut config = dev_config();
        config.domain = Some("app.example.com".to_string());
        assert!(matches!(
            synthesize(&config),
            Err(ComposeError::CustomDomainWithoutCertificate { .. })
        ));
    }

    #[test]
    fn test_run_writes_both_templates() {
        let dir = tempfile::tempdir().unwrap();
        let global = crate::Global {
            silent: true,
            verbose: false,
            config_dir: dir.path().to_path_buf(),
            out_dir: dir.path().to_path_buf(),
        };
        run(&dev_config(), dir.path(), &global).unwrap();
        assert!(dir.path().join("MaterialDashboard-Dev.template.json").exists());
        assert!(dir.path().join("MaterialDashboardToolkit.template.json").exists());
    }
}
