//! Repository engine backed by the `dnf` command line
//!
//! Repository selection is kept in-process and replayed as
//! `--disablerepo`/`--enablerepo`/`--setopt` options on every dnf call.
//! Metadata queries go through `dnf repoquery`; the package body itself is
//! streamed over HTTP so transfer progress can be reported.

use super::engine::{MetadataPolicy, ProgressFn, Repo, RepoEngine, RepoPackage};
use crate::error::{DebuginfoError, DebuginfoResult};
use crate::tools::ToolCommand;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::debug;

/// Query format for `repoquery`, one tab-separated row per package
const QUERY_FORMAT: &str =
    "%{name}\t%{epoch}\t%{version}\t%{release}\t%{arch}\t%{downloadsize}\t%{installsize}\t%{location}\t%{repoid}\n";

const QUERY_FIELDS: usize = 9;

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RepoState {
    Enabled { skip_if_unavailable: bool },
    Disabled,
}

/// Repository engine driving `dnf`
pub struct DnfEngine {
    dnf: ToolCommand,
    selection: Mutex<BTreeMap<String, RepoState>>,
    cache_only: AtomicBool,
    cancel: Arc<AtomicBool>,
}

impl DnfEngine {
    /// Create an engine around the given dnf command
    ///
    /// `cancel` is polled while a package body is being copied.
    pub fn new(dnf: ToolCommand, cancel: Arc<AtomicBool>) -> Self {
        Self {
            dnf,
            selection: Mutex::new(BTreeMap::new()),
            cache_only: AtomicBool::new(false),
            cancel,
        }
    }

    /// Options reproducing the current repository selection
    fn repo_options(&self) -> Vec<String> {
        let selection = self
            .selection
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut options = Vec::new();
        for (id, state) in selection.iter() {
            match state {
                RepoState::Disabled => options.push(format!("--disablerepo={}", id)),
                RepoState::Enabled {
                    skip_if_unavailable,
                } => {
                    options.push(format!("--enablerepo={}", id));
                    if *skip_if_unavailable {
                        options.push(format!("--setopt={}.skip_if_unavailable=True", id));
                    }
                }
            }
        }
        options
    }

    fn set_state(&self, id: &str, state: RepoState) {
        self.selection
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(id.to_string(), state);
    }

    /// Run a dnf subcommand with the repository selection applied
    async fn exec(&self, args: &[&str]) -> DebuginfoResult<String> {
        let mut full: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        full.extend(self.repo_options());
        if self.cache_only.load(Ordering::Relaxed) {
            full.push("--cacheonly".to_string());
        }

        let output = self.dnf.capture(&full).await?;
        if output.success() {
            Ok(output.stdout)
        } else {
            Err(DebuginfoError::RepoQuery {
                command: format!("{} {}", self.dnf, full.join(" ")),
                stderr: output.stderr.trim().to_string(),
            })
        }
    }

    /// Resolve the full download URL of a package
    async fn package_url(&self, package: &RepoPackage) -> DebuginfoResult<String> {
        let nevra = package.nevra();
        let stdout = self
            .exec(&["repoquery", "--quiet", "--location", nevra.as_str()])
            .await?;
        stdout
            .lines()
            .map(str::trim)
            .find(|line| line.contains("://"))
            .map(str::to_string)
            .ok_or_else(|| DebuginfoError::UnparseableOutput {
                tool: "dnf repoquery --location".to_string(),
                line: stdout.trim().to_string(),
            })
    }
}

#[async_trait]
impl RepoEngine for DnfEngine {
    async fn repos(&self) -> DebuginfoResult<Vec<Repo>> {
        let output = self.dnf.capture(["repolist", "--all", "--quiet"]).await?;
        if !output.success() {
            return Err(DebuginfoError::RepoQuery {
                command: format!("{} repolist --all", self.dnf),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(parse_repolist(&output.stdout))
    }

    async fn disable_repo(&self, id: &str) -> DebuginfoResult<()> {
        self.set_state(id, RepoState::Disabled);
        Ok(())
    }

    async fn enable_repo(&self, id: &str, skip_if_unavailable: bool) -> DebuginfoResult<()> {
        self.set_state(
            id,
            RepoState::Enabled {
                skip_if_unavailable,
            },
        );
        Ok(())
    }

    async fn populate_metadata(&self, policy: MetadataPolicy) -> DebuginfoResult<()> {
        let args: &[&str] = match policy {
            MetadataPolicy::PreferCache => &["makecache", "--quiet"],
            MetadataPolicy::CacheOnly => &["makecache", "--quiet", "--cacheonly"],
        };
        self.exec(args).await?;
        // Metadata is current from here on; searches must not refresh it again
        self.cache_only.store(true, Ordering::Relaxed);
        Ok(())
    }

    async fn search_file(&self, path: &Path) -> DebuginfoResult<Vec<RepoPackage>> {
        let path = path.to_string_lossy().into_owned();
        let stdout = self
            .exec(&["repoquery", "--quiet", "--queryformat", QUERY_FORMAT, "--file", path.as_str()])
            .await?;
        parse_query_rows(&stdout)
    }

    async fn download(
        &self,
        package: &RepoPackage,
        dest: &Path,
        progress: ProgressFn<'_>,
    ) -> DebuginfoResult<()> {
        let url = self.package_url(package).await?;
        debug!("Downloading {} from {}", package, url);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let dest_path = dest.to_path_buf();
        let cancel = Arc::clone(&self.cancel);
        let name = package.to_string();
        let transfer = tokio::task::spawn_blocking(move || {
            fetch_to_file(&url, &dest_path, &cancel, |read, total| {
                let _ = tx.send((read, total));
            })
        });

        while let Some((read, total)) = rx.recv().await {
            progress(read, total);
        }

        transfer
            .await
            .map_err(|e| DebuginfoError::Internal(format!("download task failed: {}", e)))?
            .map_err(|reason| DebuginfoError::Download {
                package: name,
                reason,
            })
    }

    fn engine_name(&self) -> &'static str {
        "dnf"
    }
}

/// Copy `url` into `dest`, removing the partial file on failure
fn fetch_to_file(
    url: &str,
    dest: &Path,
    cancel: &AtomicBool,
    mut report: impl FnMut(u64, Option<u64>),
) -> Result<(), String> {
    let result = copy_body(url, dest, cancel, &mut report);
    if result.is_err() {
        let _ = std::fs::remove_file(dest);
    }
    result
}

fn copy_body(
    url: &str,
    dest: &Path,
    cancel: &AtomicBool,
    report: &mut impl FnMut(u64, Option<u64>),
) -> Result<(), String> {
    let response = ureq::get(url).call().map_err(|e| e.to_string())?;
    let body = response.into_body();
    let total = body.content_length();
    let mut reader = body.into_reader();
    let mut file = std::fs::File::create(dest)
        .map_err(|e| format!("can't create {}: {}", dest.display(), e))?;

    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut read_total = 0u64;
    report(0, total);
    loop {
        if cancel.load(Ordering::Relaxed) {
            return Err("cancelled".to_string());
        }
        let n = reader.read(&mut buf).map_err(|e| e.to_string())?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])
            .map_err(|e| format!("can't write {}: {}", dest.display(), e))?;
        read_total += n as u64;
        report(read_total, total);
    }
    file.flush().map_err(|e| e.to_string())
}

/// Parse `dnf repolist --all` output into repositories
///
/// Rows are `<id> <name...> <enabled|disabled>`; the header row is skipped.
pub fn parse_repolist(text: &str) -> Vec<Repo> {
    text.lines()
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            let id = columns.next()?;
            let status = columns.last()?;
            let enabled = match status {
                "enabled" => true,
                "disabled" => false,
                _ => return None,
            };
            Some(Repo {
                id: id.to_string(),
                enabled,
            })
        })
        .collect()
}

/// Parse rows printed with [`QUERY_FORMAT`]
pub fn parse_query_rows(text: &str) -> DebuginfoResult<Vec<RepoPackage>> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_query_row)
        .collect()
}

fn parse_query_row(line: &str) -> DebuginfoResult<RepoPackage> {
    let unparseable = || DebuginfoError::UnparseableOutput {
        tool: "dnf repoquery".to_string(),
        line: line.to_string(),
    };

    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != QUERY_FIELDS {
        return Err(unparseable());
    }
    let number = |s: &str| s.trim().parse::<u64>().map_err(|_| unparseable());

    Ok(RepoPackage {
        name: fields[0].to_string(),
        epoch: fields[1].trim().parse().map_err(|_| unparseable())?,
        version: fields[2].to_string(),
        release: fields[3].to_string(),
        arch: fields[4].to_string(),
        size: number(fields[5])?,
        installed_size: number(fields[6])?,
        location: fields[7].to_string(),
        repo_id: fields[8].trim().to_string(),
    })
}
