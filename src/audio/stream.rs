use crate::audio::decoder::{
    adapt_channels, resample_linear, DecodedTrack, TARGET_CHANNELS, TARGET_SAMPLE_RATE,
};

/// A track converted to the device's native format, plus a read cursor.
///
/// All conversion happens in `from_decoded`; after that the only operations
/// are cursor moves and memory copies, which is what lets the output callback
/// call `pull` without ever blocking or allocating.
pub struct AudioStream {
    samples: Vec<f32>,
    cursor: usize,
}

impl AudioStream {
    /// Converts a decoded track into target format (f32, stereo, 48 kHz):
    /// resample first, then adapt channel count.
    pub fn from_decoded(track: DecodedTrack) -> Self {
        let source_channels = track.channels as usize;
        let mut pcm = track.samples;

        if track.sample_rate != TARGET_SAMPLE_RATE {
            log::warn!(
                "Track rate {} Hz differs from device {} Hz; applying linear resampling before playback.",
                track.sample_rate,
                TARGET_SAMPLE_RATE
            );
            pcm = resample_linear(&pcm, track.sample_rate, TARGET_SAMPLE_RATE, source_channels);
        }

        if source_channels != TARGET_CHANNELS {
            pcm = adapt_channels(&pcm, source_channels, TARGET_CHANNELS);
        }

        // Drop any trailing partial frame so the buffer is always whole
        // stereo pairs.
        let whole = pcm.len() - (pcm.len() % TARGET_CHANNELS);
        pcm.truncate(whole);

        Self {
            samples: pcm,
            cursor: 0,
        }
    }

    /// Rewinds to the start of the already-converted buffer. Used by
    /// restart-playback; never re-decodes.
    pub fn refill(&mut self) {
        self.cursor = 0;
    }

    /// Copies up to `out.len()` samples into `out`, advancing the cursor.
    /// Returns how many were copied: fewer than requested at end-of-data,
    /// zero once exhausted. Safe to call from the real-time callback.
    pub fn pull(&mut self, out: &mut [f32]) -> usize {
        let available = self.samples.len() - self.cursor;
        let count = out.len().min(available);
        out[..count].copy_from_slice(&self.samples[self.cursor..self.cursor + count]);
        self.cursor += count;
        count
    }

    pub fn remaining(&self) -> usize {
        self.samples.len() - self.cursor
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
