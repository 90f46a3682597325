//! Xilinx toolchain detection helpers.
//!
//! Releases up to 2019.1 ship the Xilinx SDK for software builds; from 2019.2
//! on the SDK is replaced by Vitis, which changes both the tools to invoke and
//! the project layout they expect.

use core::fmt::{Display, Formatter};

use crate::{Error, Result};

/// Suffix of toolchain launchers on the host platform
#[cfg(windows)]
pub const BIN_EXTENSION: &str = ".bat";
/// Suffix of toolchain launchers on the host platform
#[cfg(not(windows))]
pub const BIN_EXTENSION: &str = "";

/// Last release that ships the legacy SDK
const LAST_SDK_RELEASE: ToolchainVersion = ToolchainVersion {
    year: 2019,
    minor: 1,
};

/// Software toolchain flavor of a Xilinx release
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Toolchain {
    /// Xilinx SDK (2019.1 and earlier)
    Sdk,
    /// Vitis (2019.2 and later)
    Vitis,
}

impl Toolchain {
    /// Numeric code of the flavor, `0` for SDK and `1` for Vitis
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Toolchain::Sdk => 0,
            Toolchain::Vitis => 1,
        }
    }
}

impl Display for Toolchain {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Toolchain::Sdk => "sdk",
            Toolchain::Vitis => "vitis",
        };

        write!(f, "{name}")
    }
}

/// Leading `year.minor` components of a release version
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ToolchainVersion {
    pub year: u32,
    pub minor: u32,
}

impl ToolchainVersion {
    /// Parses the first two dot-separated components of `version`.
    ///
    /// Further components such as the patch level in `2020.2.2` are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidVersion`] if there are fewer than two
    /// components or either of them is not an integer.
    pub fn parse(version: &str) -> Result<Self> {
        let invalid = || Error::InvalidVersion(version.to_string());
        let mut parts = version.trim().split('.');

        let year: u32 = parts
            .next()
            .and_then(|part| part.parse().ok())
            .ok_or_else(invalid)?;
        let minor: u32 = parts
            .next()
            .and_then(|part| part.parse().ok())
            .ok_or_else(invalid)?;

        Ok(Self { year, minor })
    }

    /// Software toolchain flavor of this release
    #[must_use]
    pub fn toolchain(self) -> Toolchain {
        if self <= LAST_SDK_RELEASE {
            Toolchain::Sdk
        } else {
            Toolchain::Vitis
        }
    }
}

/// Classifies a release version string, see [`ToolchainVersion::parse`].
///
/// # Errors
///
/// Returns [`Error::InvalidVersion`] on malformed input.
pub fn classify(version: &str) -> Result<Toolchain> {
    Ok(ToolchainVersion::parse(version)?.toolchain())
}

/// Name of a toolchain launcher on the host platform, e.g. `vivado.bat` on
/// Windows and `vivado` elsewhere
#[must_use]
pub fn tool_binary(name: &str) -> String {
    format!("{name}{BIN_EXTENSION}")
}
