/*
    MartyPC
    https://github.com/dbalsom/martypc

    Copyright 2022-2025 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    config.rs

    Configuration for the Cirrus Logic device, read from a [cirrus] TOML table.

*/

use std::path::Path;

use anyhow::Context;
use serde_derive::Deserialize;

use crate::devices::cirrus::variant::{ChipVariant, VRAM_1M, VRAM_256K};

#[derive(thiserror::Error, Debug)]
pub enum CirrusError {
    #[error("Video memory size {0:#X} is not a power of two of at least 256K")]
    InvalidVramSize(usize),
    #[error("Video memory size {size:#X} exceeds the {max:#X} byte maximum of the {variant}")]
    VramTooLarge { size: usize, max: usize, variant: ChipVariant },
    #[error("Linear aperture base {0:#X} is not aligned to the video memory size")]
    MisalignedAperture(usize),
    #[error("Error parsing configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

fn default_vram_size() -> usize {
    VRAM_1M
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CirrusConfig {
    #[serde(default)]
    pub variant: ChipVariant,
    #[serde(default = "default_vram_size")]
    pub vram_size: usize,
    /// Base address of the linear framebuffer aperture, if one should be mapped.
    #[serde(default)]
    pub linear_base: Option<usize>,
    #[serde(default)]
    pub debug: bool,
}

impl Default for CirrusConfig {
    fn default() -> Self {
        Self {
            variant: ChipVariant::default(),
            vram_size: default_vram_size(),
            linear_base: None,
            debug: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    cirrus: CirrusConfig,
}

impl CirrusConfig {
    pub fn new(variant: ChipVariant, vram_size: usize) -> Self {
        Self {
            variant,
            vram_size,
            ..Default::default()
        }
    }

    /// Parse a configuration from a TOML document containing a [cirrus] table.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, CirrusError> {
        let file: ConfigFile = toml::from_str(toml_str)?;
        file.cirrus.validate()?;
        Ok(file.cirrus)
    }

    pub fn validate(&self) -> Result<(), CirrusError> {
        if self.vram_size < VRAM_256K || !self.vram_size.is_power_of_two() {
            return Err(CirrusError::InvalidVramSize(self.vram_size));
        }
        let max = self.variant.caps().max_vram;
        if self.vram_size > max {
            return Err(CirrusError::VramTooLarge {
                size: self.vram_size,
                max,
                variant: self.variant,
            });
        }
        if let Some(base) = self.linear_base {
            if base & (self.vram_size - 1) != 0 {
                return Err(CirrusError::MisalignedAperture(base));
            }
        }
        Ok(())
    }
}

/// Read and validate a configuration file.
pub fn load_config(path: &Path) -> anyhow::Result<CirrusConfig> {
    let toml_str = std::fs::read_to_string(path)
        .with_context(|| format!("Couldn't read configuration file: {}", path.display()))?;
    let config = CirrusConfig::from_toml_str(&toml_str)
        .with_context(|| format!("Invalid configuration file: {}", path.display()))?;
    log::debug!(
        "Loaded {} configuration with {}K of video memory",
        config.variant,
        config.vram_size / 1024
    );
    Ok(config)
}
