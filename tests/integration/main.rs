//! Integration tests for debuginfo-install

/// eu-unstrip row for a module with the given build id
fn unstrip_row(index: usize, build_id: &str) -> String {
    format!(
        "0x7f{index}000+0x20000 {build_id}@0x7f{index}2a8 /usr/lib64/libmod{index}.so.1 - libmod{index}.so.1"
    )
}

/// Shell script printing an eu-unstrip module table
fn unstrip_script(build_ids: &[&str]) -> String {
    build_ids
        .iter()
        .enumerate()
        .map(|(i, id)| format!("echo '{}'\n", unstrip_row(i, id)))
        .collect()
}

mod cli_tests {
    use super::unstrip_script;
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use std::process::{Output, Stdio};
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    const BUILD_ID: &str = "c4d35d993598a6242f7525d024b5ec3becf5b447";

    fn debuginfo_install() -> Command {
        let mut cmd = cargo_bin_cmd!("debuginfo-install");
        cmd.env_remove("ABRT_VERBOSE")
            .env_remove("DEBUGINFO_INSTALL_CONFIG");
        cmd
    }

    /// Config pointing every external program at a shell stand-in
    fn write_config(dir: &Path, unstrip: &str) -> std::path::PathBuf {
        let path = dir.join("config.toml");
        let config = format!(
            r#"
[store]
cache_dir = "{cache}"
system_root = "{sysroot}"

[repo]
program = {{ program = "sh", args = ["-c", "exit 0", "dnf"] }}

[tools.unstrip]
program = "sh"
args = ["-c", {unstrip:?}, "eu-unstrip"]
"#,
            cache = dir.join("cache").display(),
            sysroot = dir.join("sysroot").display(),
            unstrip = unstrip,
        );
        std::fs::write(&path, config).unwrap();
        path
    }

    #[test]
    fn help_displays() {
        debuginfo_install()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("--core"))
            .stdout(predicate::str::contains("--keeprpms"));
    }

    #[test]
    fn version_displays() {
        debuginfo_install()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("debuginfo-install"));
    }

    #[test]
    fn missing_core_fails() {
        debuginfo_install()
            .arg("-y")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("--core"));
    }

    #[test]
    fn invalid_config_fails() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("config.toml");
        std::fs::write(&config, "[store\n").unwrap();

        debuginfo_install()
            .args(["--core=core", "--config"])
            .arg(&config)
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn no_build_ids_fails() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "exit 0");

        debuginfo_install()
            .args(["--core=/var/spool/abrt/ccpp-1/coredump", "--config"])
            .arg(&config)
            .assert()
            .code(2)
            .stderr(predicate::str::contains(
                "Can't get build ids from /var/spool/abrt/ccpp-1/coredump",
            ));
    }

    #[test]
    fn all_available_succeeds() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), &unstrip_script(&[BUILD_ID]));
        let cached = temp
            .path()
            .join("cache/usr/lib/debug/.build-id/c4/d35d993598a6242f7525d024b5ec3becf5b447.debug");
        std::fs::create_dir_all(cached.parent().unwrap()).unwrap();
        std::fs::write(&cached, b"ELF").unwrap();

        debuginfo_install()
            .args(["--core=core", "--config"])
            .arg(&config)
            .assert()
            .success()
            .stdout(predicate::str::contains("All 1 debuginfo files are available"));
    }

    #[test]
    fn unresolvable_files_are_reported() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), &unstrip_script(&[BUILD_ID]));
        let workdir = temp.path().join("work");

        debuginfo_install()
            .args(["--core=core", "--config"])
            .arg(&config)
            .arg("--tmpdir")
            .arg(&workdir)
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Coredump references 1 debuginfo files, 1 of them are not installed",
            ))
            .stdout(predicate::str::contains(
                "Missing debuginfo file: /usr/lib/debug/.build-id/c4/d35d993598a6242f7525d024b5ec3becf5b447.debug",
            ));
        assert!(!workdir.exists());
    }

    /// Run against an eu-unstrip stand-in that hangs, then deliver `signal`
    ///
    /// The working directory is pre-populated so its removal is observable.
    fn signal_hanging_run(temp: &TempDir, signal: &str) -> Output {
        let started = temp.path().join("started");
        let config = write_config(
            temp.path(),
            &format!("touch '{}'; exec sleep 20", started.display()),
        );
        let workdir = temp.path().join("work");
        std::fs::create_dir_all(&workdir).unwrap();
        std::fs::write(workdir.join("glibc-debuginfo.rpm"), b"rpm").unwrap();

        let child = std::process::Command::new(env!("CARGO_BIN_EXE_debuginfo-install"))
            .env_remove("ABRT_VERBOSE")
            .env_remove("DEBUGINFO_INSTALL_CONFIG")
            .args(["--core=core", "--config"])
            .arg(&config)
            .arg("--tmpdir")
            .arg(&workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();

        // Handlers are installed before eu-unstrip runs
        let deadline = Instant::now() + Duration::from_secs(10);
        while !started.exists() {
            assert!(Instant::now() < deadline, "eu-unstrip stand-in never started");
            std::thread::sleep(Duration::from_millis(20));
        }

        let status = std::process::Command::new("kill")
            .arg(format!("-{}", signal))
            .arg(child.id().to_string())
            .status()
            .unwrap();
        assert!(status.success());

        let output = child.wait_with_output().unwrap();
        assert!(!workdir.exists());
        output
    }

    #[test]
    fn sigterm_cleans_up_and_exits_zero() {
        let temp = TempDir::new().unwrap();
        let output = signal_hanging_run(&temp, "TERM");

        assert_eq!(output.status.code(), Some(0));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(!stdout.contains("Exiting on user command"));
    }

    #[test]
    fn sigint_says_goodbye() {
        let temp = TempDir::new().unwrap();
        let output = signal_hanging_run(&temp, "INT");

        assert_eq!(output.status.code(), Some(0));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Exiting on user command"));
    }

    #[test]
    fn verbosity_preset_is_tolerated() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "exit 0");

        debuginfo_install()
            .env("ABRT_VERBOSE", "not-a-number")
            .args(["--core=core", "--config"])
            .arg(&config)
            .assert()
            .code(2);
    }
}

mod pipeline_tests {
    use super::unstrip_script;
    use async_trait::async_trait;
    use debuginfo_install::acquire::AcquisitionOutcome;
    use debuginfo_install::cli::execute;
    use debuginfo_install::config::ToolsConfig;
    use debuginfo_install::context::RunContext;
    use debuginfo_install::debuginfo::BuildId;
    use debuginfo_install::error::DebuginfoResult;
    use debuginfo_install::repo::{MetadataPolicy, ProgressFn, Repo, RepoEngine, RepoPackage};
    use debuginfo_install::tools::ToolCommand;
    use debuginfo_install::ui::UiContext;
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use tempfile::TempDir;

    const CACHED: &str = "11aa11aa11aa11aa11aa11aa11aa11aa11aa11aa";
    const PROVIDED: &str = "22bb22bb22bb22bb22bb22bb22bb22bb22bb22bb";
    const ORPHAN: &str = "33cc33cc33cc33cc33cc33cc33cc33cc33cc33cc";

    /// In-memory repository index
    struct FakeRepos {
        repos: Mutex<Vec<Repo>>,
        index: HashMap<PathBuf, RepoPackage>,
        downloads: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RepoEngine for FakeRepos {
        async fn repos(&self) -> DebuginfoResult<Vec<Repo>> {
            Ok(self.repos.lock().unwrap().clone())
        }

        async fn disable_repo(&self, id: &str) -> DebuginfoResult<()> {
            self.repos.lock().unwrap().retain(|r| r.id != id);
            Ok(())
        }

        async fn enable_repo(&self, _id: &str, _skip_if_unavailable: bool) -> DebuginfoResult<()> {
            Ok(())
        }

        async fn populate_metadata(&self, _policy: MetadataPolicy) -> DebuginfoResult<()> {
            Ok(())
        }

        async fn search_file(&self, path: &Path) -> DebuginfoResult<Vec<RepoPackage>> {
            Ok(self.index.get(path).cloned().into_iter().collect())
        }

        async fn download(
            &self,
            package: &RepoPackage,
            dest: &Path,
            progress: ProgressFn<'_>,
        ) -> DebuginfoResult<()> {
            self.downloads.lock().unwrap().push(package.name.clone());
            std::fs::write(dest, b"debuginfo payload").unwrap();
            progress(package.size, Some(package.size));
            Ok(())
        }

        fn engine_name(&self) -> &'static str {
            "fake"
        }
    }

    fn debug_path(id: &str) -> PathBuf {
        BuildId::new(id)
            .unwrap()
            .debuginfo_path()
            .as_path()
            .to_path_buf()
    }

    #[tokio::test]
    async fn installs_only_what_is_missing() {
        let temp = TempDir::new().unwrap();
        let mut ctx = RunContext::new(temp.path().join("cache"), temp.path().join("work"));
        ctx.system_root = temp.path().join("sysroot");

        // cpio stand-in that materializes the provided debuginfo file
        let provided = debug_path(PROVIDED);
        let relative = provided.strip_prefix("/").unwrap().display().to_string();
        let extract = format!(
            "mkdir -p \"$(dirname {0})\" && cat > {0}",
            relative
        );
        ctx.tools = ToolsConfig {
            unstrip: ToolCommand::with_args(
                "sh",
                ["-c".to_string(), unstrip_script(&[CACHED, PROVIDED, ORPHAN]), "eu-unstrip".to_string()],
            ),
            rpm2cpio: ToolCommand::with_args("sh", ["-c", "cat \"$1\"", "rpm2cpio"]),
            cpio: ToolCommand::with_args("sh", ["-c".to_string(), extract, "cpio".to_string()]),
        };

        let cached = ctx.cache_dir.join(debug_path(CACHED).strip_prefix("/").unwrap());
        std::fs::create_dir_all(cached.parent().unwrap()).unwrap();
        std::fs::write(&cached, b"ELF").unwrap();

        let package = RepoPackage {
            name: "openssl-debuginfo".to_string(),
            epoch: 1,
            version: "3.1.1".to_string(),
            release: "4.fc39".to_string(),
            arch: "x86_64".to_string(),
            size: 3_500_000,
            installed_size: 12_000_000,
            location: "Packages/o/openssl-debuginfo-3.1.1-4.fc39.x86_64.rpm".to_string(),
            repo_id: "fedora-debuginfo".to_string(),
        };
        let engine = FakeRepos {
            repos: Mutex::new(vec![
                Repo {
                    id: "fedora".to_string(),
                    enabled: true,
                },
                Repo {
                    id: "fedora-debuginfo".to_string(),
                    enabled: false,
                },
            ]),
            index: HashMap::from([(provided.clone(), package)]),
            downloads: Mutex::new(Vec::new()),
        };

        let report = execute(
            Path::new("core"),
            &ctx,
            &UiContext::non_interactive(),
            &engine,
            "debuginfo",
            Box::new(Cursor::new(Vec::new())),
        )
        .await
        .unwrap();

        assert_eq!(report.referenced, 3);
        assert_eq!(report.missing_before, 2);
        assert_eq!(
            report.acquisition,
            Some(AcquisitionOutcome::Completed { failed: vec![] })
        );
        assert_eq!(*engine.downloads.lock().unwrap(), vec!["openssl-debuginfo".to_string()]);
        assert_eq!(
            report.still_missing,
            vec![BuildId::new(ORPHAN).unwrap().debuginfo_path()]
        );
        assert!(ctx.cache_dir.join(provided.strip_prefix("/").unwrap()).exists());
        // Non-debuginfo repositories were switched off
        assert_eq!(engine.repos.lock().unwrap().len(), 1);
    }
}
