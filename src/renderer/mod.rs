//! Renderer: the offline recorder.
//!
//! Drives a fresh `Playback` from the opening frame through every history
//! step, rasterizes each frame through the `Scene` and keeps the grids in a
//! `Recording`.
//! The recording can then be written as a JSON `PlayablePresentation` or as
//! a standalone HTML page. Writing may fail and be retried; the recording
//! itself stays in memory.

pub mod html;

use std::fs;
use std::path::Path;

use tracing::info;

use crate::canvas::{Canvas, Grid};
use crate::engine::Replay;
use crate::engine::playback::Playback;
use crate::error::{ReplayError, ReplayResult};
use crate::scene::Scene;
use crate::types::{Frame, Marker, PlayablePresentation, TerminalContract};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    Html,
}

impl ArtifactFormat {
    /// `.json` means JSON; everything else gets the standalone page.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ArtifactFormat::Json,
            _ => ArtifactFormat::Html,
        }
    }
}

/// Every rendered frame of one straight play.
#[derive(Debug, Clone)]
pub struct Recording {
    pub contract: TerminalContract,
    pub interval_ms: u64,
    pub frames: Vec<Grid>,
    pub markers: Vec<Marker>,
}

pub struct Recorder;

impl Recorder {
    /// Render one frame per history step. A decisive frame does not cut the
    /// recording short; its outcome is marked once, where it first occurs.
    #[tracing::instrument(skip_all, fields(frames = replay.history().len()))]
    pub fn record(replay: &Replay, scene: &Scene<'_>, interval_ms: u64) -> Recording {
        let (width, height) = scene.background().size();
        let mut playback = Playback::new(replay);
        let mut frames = Vec::with_capacity(replay.history().len());
        let mut markers = Vec::new();
        let mut decided = false;

        loop {
            let snapshot = playback.frame();
            let frame_index = frames.len();

            if let Some(record) = replay.history().frame(snapshot.view.index) {
                markers.extend(record.log_events.iter().map(|label| Marker {
                    frame_index,
                    label: label.clone(),
                }));
            }
            if let Some(outcome) = snapshot.view.outcome.filter(|_| !decided) {
                decided = true;
                markers.push(Marker {
                    frame_index,
                    label: format!("{} at step {}", outcome.banner(), snapshot.view.step),
                });
            }

            let mut grid = Grid::new(width, height);
            scene.draw(&mut grid, snapshot);
            frames.push(grid);

            if !playback.advance() {
                break;
            }
        }

        info!(recorded = frames.len(), mode = ?playback.mode(), "recorded replay");
        Recording {
            contract: TerminalContract { width, height },
            interval_ms,
            frames,
            markers,
        }
    }
}

impl Recording {
    /// Encode as a playable presentation. The first frame is always a full
    /// frame; subsequent frames are diffs against the previous frame.
    pub fn presentation(&self) -> PlayablePresentation {
        let mut frames = Vec::with_capacity(self.frames.len());
        let mut prev: Option<&Grid> = None;

        for grid in &self.frames {
            let frame = match prev {
                None => Frame::Full {
                    cells: grid.rows().to_vec(),
                },
                Some(prev) => Frame::Diff {
                    changes: prev.diff(grid),
                },
            };
            frames.push(frame);
            prev = Some(grid);
        }

        PlayablePresentation {
            contract: self.contract,
            interval_ms: self.interval_ms,
            frames,
            markers: self.markers.clone(),
        }
    }

    pub fn encode(&self, format: ArtifactFormat) -> ReplayResult<String> {
        match format {
            ArtifactFormat::Json => serde_json::to_string(&self.presentation()).map_err(|e| {
                ReplayError::ExportFailure {
                    path: Default::default(),
                    source: std::io::Error::other(e),
                }
            }),
            ArtifactFormat::Html => Ok(html::page(self)),
        }
    }

    /// Write the artifact. On failure the recording is untouched, so the
    /// caller may retry with another path.
    pub fn write(&self, path: &Path, format: ArtifactFormat) -> ReplayResult<()> {
        let body = self.encode(format).map_err(|err| match err {
            ReplayError::ExportFailure { source, .. } => ReplayError::ExportFailure {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        fs::write(path, body).map_err(|source| ReplayError::ExportFailure {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), ?format, frames = self.frames.len(), "wrote artifact");
        Ok(())
    }
}
