//! # Analysis Session
//!
//! Hands frames from a capture thread to the analysis side over a bounded
//! crossbeam channel. The capture side keeps a [`FrameSender`]; the side
//! that drives analysis (typically once per rendered frame) keeps the
//! [`AnalysisSession`] and polls it.

use crossbeam_channel::{Receiver, Sender, TrySendError};
use log::{debug, warn};

use crate::analysis::PitchTracker;
use crate::config::TunerConfig;
use crate::error::Result;
use crate::AnalysisResult;

/// Capture-side handle of a session.
#[derive(Debug, Clone)]
pub struct FrameSender {
    sender: Sender<Vec<f32>>,
}

impl FrameSender {
    /// Queues a frame for analysis without blocking.
    ///
    /// Returns `false` if the frame was dropped, either because analysis is
    /// behind and the queue is full or because the session is gone. Audio
    /// callbacks must never wait on the analysis side.
    pub fn submit(&self, frame: Vec<f32>) -> bool {
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("analysis queue full, dropping frame");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Analysis-side handle of a session. Owns the tracker and its smoothing state.
#[derive(Debug)]
pub struct AnalysisSession {
    frames: Receiver<Vec<f32>>,
    tracker: PitchTracker,
    sample_rate: u32,
}

/// Creates a session for frames captured at `sample_rate`.
///
/// At most `capacity` frames (at least one) wait in the queue.
///
/// # Errors
/// * Any error of [`PitchTracker::new`]
pub fn session(
    config: TunerConfig,
    sample_rate: u32,
    capacity: usize,
) -> Result<(FrameSender, AnalysisSession)> {
    let tracker = PitchTracker::new(config)?;
    let (sender, frames) = crossbeam_channel::bounded(capacity.max(1));
    Ok((
        FrameSender { sender },
        AnalysisSession {
            frames,
            tracker,
            sample_rate,
        },
    ))
}

impl AnalysisSession {
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn tracker(&self) -> &PitchTracker {
        &self.tracker
    }

    /// Analyzes the newest queued frame, if any.
    ///
    /// Frames queued before the newest one are stale and are discarded
    /// unanalyzed. Returns `None` when nothing was queued.
    pub fn poll(&mut self) -> Option<Result<AnalysisResult>> {
        let mut latest = None;
        let mut skipped = 0usize;
        while let Ok(frame) = self.frames.try_recv() {
            if latest.replace(frame).is_some() {
                skipped += 1;
            }
        }
        if skipped > 0 {
            debug!("skipped {skipped} stale frame(s)");
        }

        latest.map(|frame| self.tracker.process(&frame, self.sample_rate))
    }

    /// Forgets the smoothing history of this session.
    pub fn reset(&mut self) {
        self.tracker.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Detection, TunerError};
    use std::f64::consts::PI;

    fn config() -> TunerConfig {
        TunerConfig {
            window_size: 4096,
            ..TunerConfig::default()
        }
    }

    fn square(freq: f64, rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let t = i as f64 / f64::from(rate);
                (0..8)
                    .map(|k| {
                        let n = (2 * k + 1) as f64;
                        (2.0 * PI * n * freq * t).sin() / n
                    })
                    .sum::<f64>() as f32
            })
            .collect()
    }

    #[test]
    fn poll_without_frames_is_none() {
        let (_sender, mut session) = session(config(), 48_000, 4).unwrap();
        assert!(session.poll().is_none());
    }

    #[test]
    fn poll_analyzes_only_newest_frame() {
        let (sender, mut session) = session(config(), 48_000, 4).unwrap();
        assert!(sender.submit(square(220.0, 48_000, 4096)));
        assert!(sender.submit(vec![0.0; 4096]));

        let result = session.poll().unwrap().unwrap();
        assert_eq!(result.detection, Detection::NoSignal);
        assert!(session.poll().is_none());
    }

    #[test]
    fn full_queue_drops_frames() {
        let (sender, _session) = session(config(), 48_000, 1).unwrap();
        assert!(sender.submit(vec![0.0; 4096]));
        assert!(!sender.submit(vec![0.0; 4096]));
    }

    #[test]
    fn disconnected_session_drops_frames() {
        let (sender, session) = session(config(), 48_000, 1).unwrap();
        drop(session);
        assert!(!sender.submit(vec![0.0; 4096]));
    }

    #[test]
    fn frames_cross_threads() {
        let (sender, mut session) = session(config(), 48_000, 2).unwrap();
        std::thread::spawn(move || sender.submit(square(440.0, 48_000, 4096)))
            .join()
            .unwrap();

        let result = session.poll().unwrap().unwrap();
        assert!(matches!(result.detection, Detection::Pitch(_)));
    }

    #[test]
    fn bad_frames_surface_as_errors() {
        let (sender, mut session) = session(config(), 48_000, 1).unwrap();
        sender.submit(vec![0.0; 100]);
        assert!(matches!(
            session.poll(),
            Some(Err(TunerError::InvalidWindowSize { len: 100 }))
        ));
    }
}
