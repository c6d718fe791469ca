use std::sync::{
    atomic::{AtomicBool, AtomicU32, Ordering},
    Arc, Mutex,
};

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    BufferSize, SampleRate, Stream, StreamConfig,
};
use log::{info, warn};

use crate::audio::decoder::{decode_wav, TARGET_CHANNELS, TARGET_SAMPLE_RATE};
use crate::audio::mixer;
use crate::audio::stream::AudioStream;
use crate::error::PlayerError;
use crate::skin::assets::AssetSource;

/// The only state shared between the control thread and the output callback:
/// the active-stream slot plus the gain parameters and pause flag.
///
/// The slot mutex is held exclusively for pointer install/detach and the
/// bounded copy inside `pull_active`; decoding and file I/O always happen
/// outside it. Gains are float bits in atomics, last-writer-wins; a read that
/// is one callback period stale is fine because values are clamped to [0,1].
pub struct SharedPlayback {
    active: Mutex<Option<AudioStream>>,
    volume_bits: AtomicU32,
    balance_bits: AtomicU32,
    paused: AtomicBool,
}

impl SharedPlayback {
    pub fn new() -> Self {
        Self {
            active: Mutex::new(None),
            volume_bits: AtomicU32::new(1.0_f32.to_bits()),
            balance_bits: AtomicU32::new(0.5_f32.to_bits()),
            paused: AtomicBool::new(false),
        }
    }

    /// Installs a new stream. The old one (if any) is taken under the lock
    /// but dropped after release, so the callback never waits on a free.
    pub fn install(&self, stream: AudioStream) {
        let old = match self.active.lock() {
            Ok(mut guard) => guard.replace(stream),
            Err(_) => return,
        };
        drop(old);
    }

    /// Clears the slot; the callback emits silence from the next invocation.
    /// Calling with an empty slot is a no-op, so `stop` is idempotent.
    pub fn detach(&self) {
        let old = match self.active.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => return,
        };
        drop(old);
    }

    /// Rewinds the active stream in place. Returns false when the slot is
    /// empty. Cursor reset only, so the critical section stays bounded.
    pub fn rewind(&self) -> bool {
        match self.active.lock() {
            Ok(mut guard) => match guard.as_mut() {
                Some(stream) => {
                    stream.refill();
                    true
                }
                None => false,
            },
            Err(_) => false,
        }
    }

    pub fn has_track(&self) -> bool {
        self.active.lock().map(|guard| guard.is_some()).unwrap_or(false)
    }

    /// Real-time side of the slot: pulls converted samples from the active
    /// stream under the same lock the controller uses for install/detach.
    /// Both sides keep the critical section to a bounded copy or pointer
    /// move. Empty slot or poisoned lock both read as "no data".
    pub fn pull_active(&self, out: &mut [f32]) -> usize {
        match self.active.lock() {
            Ok(mut guard) => match guard.as_mut() {
                Some(stream) => stream.pull(out),
                None => 0,
            },
            Err(_) => 0,
        }
    }

    pub fn set_volume(&self, volume: f32) {
        let clamped = volume.clamp(0.0, 1.0);
        self.volume_bits.store(clamped.to_bits(), Ordering::Relaxed);
    }

    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume_bits.load(Ordering::Relaxed))
    }

    pub fn set_balance(&self, balance: f32) {
        let clamped = balance.clamp(0.0, 1.0);
        self.balance_bits.store(clamped.to_bits(), Ordering::Relaxed);
    }

    pub fn balance(&self) -> f32 {
        f32::from_bits(self.balance_bits.load(Ordering::Relaxed))
    }

    /// Flips the pause flag and returns the new value.
    pub fn toggle_pause(&self) -> bool {
        !self.paused.fetch_xor(true, Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}

impl Default for SharedPlayback {
    fn default() -> Self {
        Self::new()
    }
}

/// Control-thread owner of the output device and the active track.
///
/// All operations here run on the control thread; the device thread only
/// ever touches `SharedPlayback` through the mixing callback.
pub struct PlayerEngine {
    shared: Arc<SharedPlayback>,
    stream: Option<Stream>,
}

impl PlayerEngine {
    /// Opens the default output device at the fixed target format and starts
    /// the callback. Failure here is surfaced as `DeviceError`; there is no
    /// fallback audio path, so callers treat it as fatal.
    pub fn open() -> Result<Self, PlayerError> {
        let shared = Arc::new(SharedPlayback::new());

        let host = cpal::default_host();
        let device = host.default_output_device().ok_or_else(|| {
            PlayerError::DeviceError("no default output device available".to_string())
        })?;

        let config = StreamConfig {
            channels: TARGET_CHANNELS as u16,
            sample_rate: SampleRate(TARGET_SAMPLE_RATE),
            buffer_size: BufferSize::Default,
        };
        info!(
            "Opening output device at {} Hz, {} channels, f32",
            TARGET_SAMPLE_RATE, TARGET_CHANNELS
        );

        let callback_shared = Arc::clone(&shared);
        let err_fn = |err| warn!("Audio stream error: {err}");
        let stream = device
            .build_output_stream(
                &config,
                move |output: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    mixer::fill_output(&callback_shared, output);
                },
                err_fn,
                None,
            )
            .map_err(|e| PlayerError::DeviceError(format!("failed to build output stream: {e}")))?;
        stream
            .play()
            .map_err(|e| PlayerError::DeviceError(format!("failed to start stream: {e}")))?;

        Ok(Self {
            shared,
            stream: Some(stream),
        })
    }

    /// Engine without a device, for exercising controller logic headless.
    #[cfg(test)]
    pub(crate) fn without_device() -> Self {
        Self {
            shared: Arc::new(SharedPlayback::new()),
            stream: None,
        }
    }

    pub fn shared(&self) -> &Arc<SharedPlayback> {
        &self.shared
    }

    /// Replaces the active track. Replacement protocol: detach the old
    /// stream under the slot lock, drop it unlocked, resolve and decode the
    /// new one unlocked (this may be slow), then relock only to install.
    /// During that window the callback plays silence, which is the intended
    /// brief gap. Any failure leaves playback stopped, not resumed on the
    /// old track.
    pub fn load(&self, source: &AssetSource, name: &str) -> Result<(), PlayerError> {
        self.shared.detach();

        let bytes = source.resolve(name)?;
        let track = decode_wav(&bytes)?;
        info!(
            "Loaded track {name}: {} ch at {} Hz, {} samples",
            track.channels,
            track.sample_rate,
            track.samples.len()
        );

        self.shared.install(AudioStream::from_decoded(track));
        Ok(())
    }

    /// Re-queues the current track from the beginning without re-decoding.
    /// A missing track is not an error; there is simply nothing to rewind.
    pub fn restart(&self) -> Result<(), PlayerError> {
        self.shared.rewind();
        Ok(())
    }

    /// Flips the pause flag and suspends or resumes device delivery.
    /// Pausing keeps buffered-but-unread samples in place.
    pub fn toggle_pause(&self) {
        let paused = self.shared.toggle_pause();
        if let Some(stream) = &self.stream {
            if paused {
                if let Err(e) = stream.pause() {
                    warn!("Failed to suspend output stream: {e}");
                }
            } else if let Err(e) = stream.play() {
                warn!("Failed to resume output stream: {e}");
            }
        }
    }

    /// Removes the active stream and frees its buffer; the device keeps
    /// running and emits silence. Safe to call repeatedly.
    pub fn stop(&self) {
        self.shared.detach();
    }

    pub fn set_volume(&self, volume: f32) {
        self.shared.set_volume(volume);
    }

    pub fn set_balance(&self, balance: f32) {
        self.shared.set_balance(balance);
    }
}
