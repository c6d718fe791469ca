use crate::audio::decoder::TARGET_CHANNELS;
use crate::audio::engine::SharedPlayback;

/// Fills one device callback buffer. Runs on the output thread; must not
/// block, allocate, or touch I/O. Absence of data is silence, never an
/// error.
pub fn fill_output(shared: &SharedPlayback, output: &mut [f32]) {
    if shared.is_paused() {
        output.fill(0.0);
        return;
    }

    let volume = shared.volume();
    let balance = shared.balance();

    let pulled = shared.pull_active(output);
    // The converted buffer holds whole stereo pairs by construction.
    debug_assert_eq!(pulled % TARGET_CHANNELS, 0);

    let (mixed, tail) = output.split_at_mut(pulled);
    if volume != 1.0 {
        apply_volume(mixed, volume);
    }
    if balance != 0.5 {
        apply_balance(mixed, balance);
    }

    // End of track, empty slot, or short pull: the remainder is silence.
    tail.fill(0.0);
}

pub fn apply_volume(samples: &mut [f32], volume: f32) {
    for sample in samples {
        *sample *= volume;
    }
}

/// Literal linear-crossfade balance law: each side's weight depends only on
/// the balance value, with no constant-power normalization. At 0.0 the right
/// channel is silenced, at 1.0 the left, at 0.5 both weights are 1.0.
pub fn apply_balance(samples: &mut [f32], balance: f32) {
    let weight_left = if balance <= 0.5 { 1.0 } else { 2.0 * (1.0 - balance) };
    let weight_right = if balance >= 0.5 { 1.0 } else { 2.0 * balance };

    for pair in samples.chunks_exact_mut(2) {
        pair[0] *= weight_left;
        pair[1] *= weight_right;
    }
}
