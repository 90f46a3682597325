use crate::{Context, Result};
use fpga_builder::console;
use fpga_builder::toolchain::{self, Toolchain};

/// Classifies `version`, falling back to the configured version.
///
/// # Errors
///
/// Returns an error if no version is available or it is malformed.
pub fn classify_toolchain(version: Option<&str>, configured: Option<&str>) -> Result<Toolchain> {
    let Some(version) = version.or(configured) else {
        anyhow::bail!("No toolchain version given and none configured in [toolchain] version");
    };

    let flavor = toolchain::classify(version)
        .with_context(|| format!("Failed to classify toolchain {version}"))?;

    console::info(format_args!("{flavor} ({})", flavor.code()));
    Ok(flavor)
}
