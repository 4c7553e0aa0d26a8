//! The register seam behind the bring-up sequence.

use crate::channel::SampleTime;
use crate::device::DeviceDescriptor;

#[cfg(test)]
pub(crate) mod fake;
#[cfg(feature = "stm32f103")]
pub(crate) mod stm32f103;

/// Hardware operations the bring-up sequence is written against.
///
/// The register backend programs the converter and its DMA channel; the
/// host tests substitute a recording fake. Every operation receives the
/// descriptor of the selected converter, so implementations carry no
/// per-device state of their own.
///
/// Implementations may assume the operations arrive in bring-up order,
/// at most once per acquisition run, with the two calibration polls as
/// the only repeated calls.
pub trait RegisterAccess {
    /// Enable the converter and DMA-controller clocks, including any
    /// converter clock prescaler the platform requires.
    fn enable_clocks(&mut self, device: &DeviceDescriptor);

    /// Program and start a circular peripheral-to-memory transfer of
    /// `len` half-words from the converter's data register into `dest`.
    ///
    /// `memory_increment` is false for a single-entry sequence, which
    /// rewrites slot zero on every conversion instead of walking the
    /// buffer.
    fn setup_transfer(
        &mut self,
        device: &DeviceDescriptor,
        dest: *mut u16,
        len: usize,
        memory_increment: bool,
    );

    /// Put the converter in continuous conversion mode with a
    /// `sequence_len`-entry regular sequence, scan mode only when more
    /// than one channel participates, right-aligned data, and the
    /// software start bit as the conversion trigger.
    fn setup_converter(&mut self, device: &DeviceDescriptor, sequence_len: u8, scan: bool);

    /// Bind converter input `channel` to conversion `rank` (1-based),
    /// sampled for `sample_time`.
    fn set_sequence_entry(
        &mut self,
        device: &DeviceDescriptor,
        rank: u8,
        channel: u8,
        sample_time: SampleTime,
    );

    /// Let the converter drive its DMA channel, and power it up ready
    /// for calibration.
    fn enable_dma_requests(&mut self, device: &DeviceDescriptor);

    /// Begin resetting the converter's calibration registers.
    fn reset_calibration(&mut self, device: &DeviceDescriptor);

    /// Whether the calibration reset is still in progress.
    fn calibration_resetting(&mut self, device: &DeviceDescriptor) -> bool;

    /// Begin offset calibration.
    fn start_calibration(&mut self, device: &DeviceDescriptor);

    /// Whether offset calibration is still in progress.
    fn calibrating(&mut self, device: &DeviceDescriptor) -> bool;

    /// Issue the software conversion start. The converter free-runs from
    /// here on; no further register traffic occurs.
    fn start_conversion(&mut self, device: &DeviceDescriptor);
}
