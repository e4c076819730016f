//! Build-id extraction from core dumps
//!
//! Runs `eu-unstrip --core=<core> -n` and parses its module table. Each row
//! looks like:
//!
//! ```text
//! 0x3afa400000+0x210000 607308f9...73ce@0x3afa4001a0 /usr/lib64/libcanberra.so.0 - libcanberra.so.0
//! ```
//!
//! i.e. address range, `<build-id>@<address>`, file, debug file, module name.

use super::path::BuildId;
use crate::error::{DebuginfoError, DebuginfoResult};
use crate::tools::ToolCommand;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Module name of the kernel-provided virtual shared object
pub const VDSO_MODULE: &str = "linux-vdso.so.1";

const BUILD_ID_COLUMN: usize = 1;
const FILE_COLUMN: usize = 2;
const MODULE_COLUMN: usize = 4;

/// Build ids found in one core dump
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreModules {
    /// Distinct build ids of loaded objects
    pub build_ids: HashSet<BuildId>,
    /// Distinct file names reported for those objects
    pub files: HashSet<String>,
}

/// Extract the build ids of every object loaded in `core`
pub async fn extract(tool: &ToolCommand, core: &Path) -> DebuginfoResult<HashSet<BuildId>> {
    let mut core_arg = std::ffi::OsString::from("--core=");
    core_arg.push(core.as_os_str());

    let output = tool
        .capture([core_arg.as_os_str(), std::ffi::OsStr::new("-n")])
        .await?;
    if !output.success() {
        warn!(
            "{} exited with {}: {}",
            tool.program,
            output.describe_status(),
            output.stderr.trim()
        );
    }

    let modules = parse_unstrip_output(&tool.program, &output.stdout)?;
    info!("Found {} build_ids", modules.build_ids.len());
    info!("Found {} libs", modules.files.len());

    if modules.build_ids.is_empty() {
        return Err(DebuginfoError::NoBuildIds {
            core: core.to_path_buf(),
        });
    }
    Ok(modules.build_ids)
}

/// Parse the module table printed by `eu-unstrip -n`
pub fn parse_unstrip_output(tool: &str, text: &str) -> DebuginfoResult<CoreModules> {
    let mut modules = CoreModules::default();

    for line in text.lines() {
        let columns: Vec<&str> = line.split_whitespace().collect();
        if columns.is_empty() {
            continue;
        }
        if columns.len() <= MODULE_COLUMN {
            return Err(unparseable(tool, line));
        }

        if columns[MODULE_COLUMN] == VDSO_MODULE {
            debug!("skipping line '{}'", line);
            continue;
        }

        let (raw_id, _address) = columns[BUILD_ID_COLUMN]
            .split_once('@')
            .ok_or_else(|| unparseable(tool, line))?;

        // Objects without a build-id note are listed as "-"
        let build_id = match BuildId::new(raw_id) {
            Ok(id) => id,
            Err(_) => {
                debug!("no usable build id in line '{}'", line);
                continue;
            }
        };

        modules.build_ids.insert(build_id);
        modules.files.insert(columns[FILE_COLUMN].to_string());
    }

    Ok(modules)
}

fn unparseable(tool: &str, line: &str) -> DebuginfoError {
    DebuginfoError::UnparseableOutput {
        tool: tool.to_string(),
        line: line.to_string(),
    }
}
