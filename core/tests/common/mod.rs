#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ripkit_core::api::{
    ArchiveSource, DownloadProgress, ExtractionSettings, RunnerPlugin, RunnerSession,
    RunnerStartArgs, SessionExit,
};
use tokio::io::AsyncRead;

/// Plays back canned stdout/stderr and an exit code instead of spawning a process.
pub struct ScriptedRunner {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    exit_code: i32,
    starts: Mutex<Vec<RunnerStartArgs>>,
    kills: Arc<AtomicUsize>,
}

impl ScriptedRunner {
    pub fn with_lines(lines: &[&str]) -> Self {
        let mut stdout = Vec::new();
        for line in lines {
            stdout.extend_from_slice(line.as_bytes());
            stdout.push(b'\n');
        }
        Self {
            stdout,
            stderr: Vec::new(),
            exit_code: 0,
            starts: Mutex::new(Vec::new()),
            kills: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn exiting(mut self, code: i32, stderr: &str) -> Self {
        self.exit_code = code;
        self.stderr = stderr.as_bytes().to_vec();
        self
    }

    pub fn start_count(&self) -> usize {
        self.starts.lock().unwrap().len()
    }

    pub fn kill_count(&self) -> usize {
        self.kills.load(Ordering::SeqCst)
    }

    pub fn last_start(&self) -> Option<RunnerStartArgs> {
        self.starts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl RunnerPlugin for ScriptedRunner {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn start_session(
        &self,
        args: &RunnerStartArgs,
    ) -> anyhow::Result<Box<dyn RunnerSession>> {
        self.starts.lock().unwrap().push(args.clone());
        Ok(Box::new(ScriptedSession {
            stdout: Some(Box::new(std::io::Cursor::new(self.stdout.clone()))),
            stderr: Some(Box::new(std::io::Cursor::new(self.stderr.clone()))),
            exit_code: self.exit_code,
            kills: self.kills.clone(),
            killed: false,
        }))
    }
}

struct ScriptedSession {
    stdout: Option<Box<dyn AsyncRead + Unpin + Send>>,
    stderr: Option<Box<dyn AsyncRead + Unpin + Send>>,
    exit_code: i32,
    kills: Arc<AtomicUsize>,
    killed: bool,
}

#[async_trait]
impl RunnerSession for ScriptedSession {
    fn stdout(&mut self) -> Option<Box<dyn AsyncRead + Unpin + Send>> {
        self.stdout.take()
    }

    fn stderr(&mut self) -> Option<Box<dyn AsyncRead + Unpin + Send>> {
        self.stderr.take()
    }

    async fn kill(&mut self) -> anyhow::Result<()> {
        self.killed = true;
        self.kills.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn wait(&mut self) -> anyhow::Result<SessionExit> {
        Ok(SessionExit {
            exit_code: if self.killed {
                None
            } else {
                Some(self.exit_code)
            },
        })
    }
}

/// Archive source that counts downloads and serves a fixed payload.
#[derive(Default)]
pub struct CountingSource {
    payload: Vec<u8>,
    calls: AtomicUsize,
}

impl CountingSource {
    pub fn serving(payload: Vec<u8>) -> Self {
        Self {
            payload,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArchiveSource for CountingSource {
    fn name(&self) -> &str {
        "counting"
    }

    async fn download(
        &self,
        _url: &str,
        dest: &Path,
        on_progress: &mut (dyn FnMut(DownloadProgress) + Send),
    ) -> anyhow::Result<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::fs::write(dest, &self.payload).await?;
        let total = self.payload.len() as u64;
        on_progress(DownloadProgress {
            transferred: total,
            total: Some(total),
        });
        Ok(total)
    }
}

pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored)
            .unix_permissions(0o755);
        for (name, contents) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents).unwrap();
        }
        writer.finish().unwrap();
    }
    cursor.into_inner()
}

/// A workspace on disk with every path the extraction step needs.
pub struct Workspace {
    pub root: tempfile::TempDir,
    pub install_dir: PathBuf,
    pub executable: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
    pub run_config: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let install_dir = root.path().join("tools/ripper");
        let input = root.path().join("game/Data");
        std::fs::create_dir_all(&input).unwrap();
        Self {
            executable: install_dir.join("ripper"),
            install_dir,
            input,
            output: root.path().join("out"),
            run_config: root.path().join("config/ripper.json"),
            root,
        }
    }

    pub fn install_tool(&self) {
        std::fs::create_dir_all(&self.install_dir).unwrap();
        std::fs::write(&self.executable, b"#!/bin/sh\n").unwrap();
    }

    pub fn settings(&self) -> ExtractionSettings {
        let mut settings = ExtractionSettings::default();
        settings.tool.executable = Some(self.executable.clone());
        settings.tool.install_dir = Some(self.install_dir.clone());
        settings.tool.archive_url = Some("https://example.invalid/ripper.zip".into());
        settings.tool.archive_name = "ripper".into();
        settings.paths.input = Some(self.input.clone());
        settings.paths.output = Some(self.output.clone());
        settings.paths.run_config = Some(self.run_config.clone());
        settings.supervisor.estimated_total_units = 4;
        settings
    }

    pub fn temp_archive(&self) -> PathBuf {
        self.root.path().join("tools/ripper.temp.zip")
    }
}
