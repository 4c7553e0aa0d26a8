//! Acquisition bring-up.
//!
//! The order below is load-bearing: the DMA channel starts listening
//! before the converter can produce data, sequence ranks are programmed
//! in buffer order, and calibration finishes before the first conversion
//! is triggered.

use crate::access::RegisterAccess;
use crate::config::ChannelTable;
use crate::device::DeviceDescriptor;

/// The one sanctioned busy-wait. Both calibration handshakes are bounded
/// by the hardware, so the loop carries no timeout.
fn block_while(mut busy: impl FnMut() -> bool) {
    while busy() {}
}

/// Walk the selected converter from idle to free-running acquisition.
///
/// `buffer` must point at least `table.enabled_count()` half-words of
/// memory that stay valid for the lifetime of the transfer.
pub(crate) fn bring_up<A: RegisterAccess>(
    access: &mut A,
    device: &DeviceDescriptor,
    table: &ChannelTable,
    buffer: *mut u16,
) {
    let count = table.enabled_count();
    let multi = count > 1;

    access.enable_clocks(device);

    // A single-entry sequence rewrites slot zero on every conversion
    // instead of walking the buffer.
    access.setup_transfer(device, buffer, count as usize, multi);
    access.setup_converter(device, count, multi);

    for slot in table.enabled() {
        let (Some(channel), Some(index)) = (slot.channel, slot.dma_index) else {
            continue;
        };
        // Rank order mirrors buffer order; a mismatch here scrambles
        // every reading.
        access.set_sequence_entry(device, index + 1, channel, slot.sample_time);
        debug!("adc: input {} -> buffer slot {}", channel, index);
    }

    access.enable_dma_requests(device);

    access.reset_calibration(device);
    block_while(|| access.calibration_resetting(device));
    access.start_calibration(device);
    block_while(|| access.calibrating(device));

    access.start_conversion(device);
}
