//! Operator-facing selection of the interface and the device.

pub mod menu;

use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use crate::kernel::device::DeviceDirectory;
use menu::{check_choice, choose};

/// Picks a device by `preselected` (1-based) or by prompting, then connects to it.
pub async fn select_device<Dir, R, W>(
    directory: &Dir,
    preselected: Option<usize>,
    input: &mut R,
    output: &mut W,
) -> Result<(String, Dir::Device)>
where
    Dir: DeviceDirectory,
    R: BufRead,
    W: Write,
{
    let listings = directory.list().await.context("Failed to list devices")?;
    writeln!(output, "Found {} devices:", listings.len())?;

    let names: Vec<&str> = listings.iter().map(|l| l.name.as_str()).collect();
    let idx = match preselected {
        Some(choice) => check_choice(choice, names.len())?,
        None => choose(input, output, "Choose a device", &names)?,
    };

    let listing = &listings[idx];
    let device = directory
        .connect(&listing.handle)
        .await
        .with_context(|| format!("Failed to connect to {}", listing.name))?;
    Ok((listing.name.clone(), device))
}
