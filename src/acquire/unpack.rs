//! Extracting downloaded packages into the cache
//!
//! A package is converted to a raw cpio archive in the working directory
//! first, then the archive is unpacked with the cache directory as the
//! extraction root. The archive never outlives the call.

use crate::context::RunContext;
use crate::error::{DebuginfoError, DebuginfoResult};
use crate::repo::RepoPackage;
use crate::tools::{describe_status, ToolCommand};
use crate::ui::{self, UiContext};
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::{debug, info, warn};

/// Name of the intermediate archive inside the working directory
pub const UNPACKED_ARCHIVE: &str = "unpacked.cpio";

/// Arguments making cpio extract, create directories and overwrite
const CPIO_EXTRACT_ARGS: [&str; 4] = ["-i", "-d", "-u", "--quiet"];

/// Turns downloaded packages into files under the cache directory
pub struct Unpacker<'a> {
    ctx: &'a RunContext,
    ui: &'a UiContext,
}

impl<'a> Unpacker<'a> {
    pub fn new(ctx: &'a RunContext, ui: &'a UiContext) -> Self {
        Self { ctx, ui }
    }

    /// Location a package is downloaded to before unpacking
    pub fn package_path(&self, package: &RepoPackage) -> PathBuf {
        self.ctx.workdir.path().join(package.file_name())
    }

    fn archive_path(&self) -> PathBuf {
        self.ctx.workdir.path().join(UNPACKED_ARCHIVE)
    }

    /// Extract the already downloaded `package` into the cache
    pub async fn unpack(&self, package: &RepoPackage) -> DebuginfoResult<()> {
        let package_path = self.package_path(package);
        let archive = self.archive_path();
        info!(
            "Extracting {} to {}",
            package_path.display(),
            self.ctx.cache_dir.display()
        );

        ui::status(
            self.ui,
            &format!("Extracting cpio from {}", package_path.display()),
        );
        if let Err(e) = self.write_archive(package, &package_path, &archive).await {
            remove_quietly(&archive);
            return Err(e);
        }
        debug!("cpio written OK");

        if !self.ctx.keep_packages {
            debug!("removing {}", package_path.display());
            if let Err(e) = std::fs::remove_file(&package_path) {
                warn!("Can't remove {}: {}", package_path.display(), e);
            }
        }

        ui::status(
            self.ui,
            &format!(
                "Caching files from {} made from {}",
                UNPACKED_ARCHIVE,
                package.file_name()
            ),
        );
        let result = self.extract_archive(package, &archive).await;
        remove_quietly(&archive);
        if result.is_ok() {
            debug!("files extracted OK");
        }
        result
    }

    /// Run rpm2cpio with its output redirected into `archive`
    async fn write_archive(
        &self,
        package: &RepoPackage,
        package_path: &Path,
        archive: &Path,
    ) -> DebuginfoResult<()> {
        let out = File::create(archive).map_err(|e| DebuginfoError::Unpack {
            package: package.to_string(),
            reason: format!("Can't write to '{}': {}", archive.display(), e),
        })?;

        let tool = &self.ctx.tools.rpm2cpio;
        let status = tool
            .command([package_path])
            .stdin(Stdio::null())
            .stdout(out)
            .status()
            .await
            .map_err(|e| DebuginfoError::tool_spawn(&tool.program, e))?;

        if !status.success() {
            return Err(unpack_failed(package, tool, status));
        }
        Ok(())
    }

    /// Run cpio inside the cache directory reading `archive` on stdin
    async fn extract_archive(&self, package: &RepoPackage, archive: &Path) -> DebuginfoResult<()> {
        let input = File::open(archive)
            .map_err(|e| DebuginfoError::io(format!("opening {}", archive.display()), e))?;

        let tool = &self.ctx.tools.cpio;
        let status = tool
            .command(CPIO_EXTRACT_ARGS)
            .current_dir(&self.ctx.cache_dir)
            .stdin(input)
            .status()
            .await
            .map_err(|e| DebuginfoError::tool_spawn(&tool.program, e))?;

        if !status.success() {
            return Err(unpack_failed(package, tool, status));
        }
        Ok(())
    }
}

fn unpack_failed(
    package: &RepoPackage,
    tool: &ToolCommand,
    status: std::process::ExitStatus,
) -> DebuginfoError {
    DebuginfoError::Unpack {
        package: package.to_string(),
        reason: format!("{} failed with {}", tool.program, describe_status(status)),
    }
}

fn remove_quietly(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("Can't remove {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// rpm2cpio stand-in copying the package, cpio stand-in storing stdin
    fn passthrough_tools() -> crate::config::ToolsConfig {
        crate::config::ToolsConfig {
            unstrip: ToolCommand::new("eu-unstrip"),
            rpm2cpio: ToolCommand::with_args("sh", ["-c", "cat \"$1\"", "rpm2cpio"]),
            cpio: ToolCommand::with_args("sh", ["-c", "cat > extracted", "cpio"]),
        }
    }

    fn package() -> RepoPackage {
        RepoPackage {
            name: "zlib-debuginfo".to_string(),
            epoch: 0,
            version: "1.2.3".to_string(),
            release: "19.fc12".to_string(),
            arch: "x86_64".to_string(),
            size: 100,
            installed_size: 300,
            location: "Packages/zlib-debuginfo-1.2.3-19.fc12.x86_64.rpm".to_string(),
            repo_id: "fedora-debuginfo".to_string(),
        }
    }

    fn setup(temp: &TempDir) -> RunContext {
        let mut ctx = RunContext::new(temp.path().join("cache"), temp.path().join("work"));
        ctx.tools = passthrough_tools();
        ctx.workdir.ensure().unwrap();
        std::fs::create_dir_all(&ctx.cache_dir).unwrap();
        ctx
    }

    #[tokio::test]
    async fn unpack_extracts_into_cache() {
        let temp = TempDir::new().unwrap();
        let ctx = setup(&temp);
        let ui = UiContext::non_interactive();
        let unpacker = Unpacker::new(&ctx, &ui);
        std::fs::write(unpacker.package_path(&package()), b"payload").unwrap();

        unpacker.unpack(&package()).await.unwrap();

        let extracted = std::fs::read(ctx.cache_dir.join("extracted")).unwrap();
        assert_eq!(extracted, b"payload");
        assert!(!ctx.workdir.path().join(UNPACKED_ARCHIVE).exists());
        assert!(!unpacker.package_path(&package()).exists());
    }

    #[tokio::test]
    async fn keep_packages_leaves_package() {
        let temp = TempDir::new().unwrap();
        let mut ctx = setup(&temp);
        ctx.keep_packages = true;
        let ui = UiContext::non_interactive();
        let unpacker = Unpacker::new(&ctx, &ui);
        std::fs::write(unpacker.package_path(&package()), b"payload").unwrap();

        unpacker.unpack(&package()).await.unwrap();
        assert!(unpacker.package_path(&package()).exists());
    }

    #[tokio::test]
    async fn rpm2cpio_failure_skips_extraction() {
        let temp = TempDir::new().unwrap();
        let mut ctx = setup(&temp);
        ctx.tools.rpm2cpio = ToolCommand::with_args("sh", ["-c", "echo partial; exit 1", "rpm2cpio"]);
        let ui = UiContext::non_interactive();
        let unpacker = Unpacker::new(&ctx, &ui);
        std::fs::write(unpacker.package_path(&package()), b"payload").unwrap();

        let err = unpacker.unpack(&package()).await.unwrap_err();
        assert!(matches!(err, DebuginfoError::Unpack { .. }));
        assert!(!ctx.workdir.path().join(UNPACKED_ARCHIVE).exists());
        assert!(!ctx.cache_dir.join("extracted").exists());
    }

    #[tokio::test]
    async fn cpio_failure_removes_archive() {
        let temp = TempDir::new().unwrap();
        let mut ctx = setup(&temp);
        ctx.tools.cpio = ToolCommand::with_args("sh", ["-c", "cat >/dev/null; exit 2", "cpio"]);
        let ui = UiContext::non_interactive();
        let unpacker = Unpacker::new(&ctx, &ui);
        std::fs::write(unpacker.package_path(&package()), b"payload").unwrap();

        let err = unpacker.unpack(&package()).await.unwrap_err();
        assert!(err.to_string().contains("exit status 2"));
        assert!(!ctx.workdir.path().join(UNPACKED_ARCHIVE).exists());
    }
}
