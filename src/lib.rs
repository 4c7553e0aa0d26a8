//! Continuous scan-mode ADC acquisition over circular DMA for STM32F1
//! microcontrollers.
//!
//! ## Overview
//!
//! Flight-controller boards route a handful of slow analog measurements
//! to the converter, such as battery voltage, RSSI, an auxiliary input
//! and current draw. This crate samples every requested channel in
//! hardware: the converter scans the configured sequence continuously
//! and the DMA controller copies each result into a fixed slot of a
//! shared buffer. Reading a measurement is then a single buffer load,
//! with no conversion latency and no per-sample CPU work.
//!
//! ## Configuration
//!
//! Requested channels are assembled into a [`ChannelRequest`], either
//! directly or from the board's [`BoardPins`] declarations plus
//! [`EnabledSensors`] flags. Bring-up resolves each pin to its converter
//! input, assigns buffer slots in [`SensorChannel`] declaration order,
//! and walks the converter through clock enable, transfer setup, sequence
//! programming, calibration and start. Pins are expected to already be in
//! analog mode; pin-mode setup belongs to the board support code.
//!
//! ## Examples
//!
//! ### Sample battery voltage and RSSI on a Naze32-style board
//!
//! ```rust, ignore
//! use adc_scan::{AdcInstance, ChannelRequest, PinTag, SensorChannel, Stm32f103};
//!
//! static mut SAMPLES: adc_scan::SampleBuffer = [0; SensorChannel::COUNT];
//!
//! let request = ChannelRequest::new()
//!     .with(SensorChannel::Battery, PinTag::PA4)
//!     .with(SensorChannel::Rssi, PinTag::PA1);
//!
//! let mut access = unsafe { Stm32f103::new() };
//! let sampler = adc_scan::initialize(
//!     &mut access,
//!     AdcInstance::Adc1,
//!     &request,
//!     unsafe { &mut *core::ptr::addr_of_mut!(SAMPLES) },
//! )?;
//!
//! let vbat = sampler.sample(SensorChannel::Battery);
//! ```
//!
//! ## Feature Flags
#![doc = document_features::document_features!()]
#![cfg_attr(not(test), no_std)]

mod fmt;

mod access;
mod channel;
mod config;
mod device;
mod init;
mod pin;

pub use self::access::RegisterAccess;
#[cfg(feature = "stm32f103")]
pub use self::access::stm32f103::Stm32f103;
pub use self::channel::{BoardPins, ChannelRequest, EnabledSensors, SampleTime, SensorChannel};
pub use self::config::{ChannelSlot, ChannelTable};
pub use self::device::{AdcInstance, ClockBus, ClockGate, DeviceDescriptor};
pub use self::pin::{PinTag, Port};

/// Acquisition errors.
///
/// Either variant is fatal to the subsystem: no hardware has been
/// started and no samples will ever be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The requested converter instance has no registry entry.
    NoSuchDevice,
    /// The named channel was requested from a pin with no analog route.
    UnresolvedPin(SensorChannel),
}

/// Backing storage for the DMA transfer, one half-word per sensor
/// channel. Only the first `enabled_count` slots are ever written.
pub type SampleBuffer = [u16; SensorChannel::COUNT];

/// Read handle over a running (or deliberately idle) acquisition.
///
/// Exists only once the DMA engine is armed or provably has nothing to
/// write, so readers can never observe a half-configured buffer.
pub struct Sampler {
    table: ChannelTable,
    samples: &'static SampleBuffer,
}

impl Sampler {
    /// Latest raw sample for `channel`, or `None` if the channel was
    /// never enabled.
    ///
    /// The DMA engine rewrites the buffer behind our back, so the slot is
    /// reloaded on every call. A word may be observed mid-update; callers
    /// sampling slower than the conversion rate see each value settle.
    pub fn sample(&self, channel: SensorChannel) -> Option<u16> {
        let index = self.table.slot(channel).dma_index?;
        Some(unsafe { core::ptr::read_volatile(&self.samples[index as usize]) })
    }

    /// Whether `channel` takes part in the scan sequence.
    pub fn is_enabled(&self, channel: SensorChannel) -> bool {
        self.table.slot(channel).enabled
    }

    /// The buffer slot `channel` is written to, if enabled.
    pub fn buffer_index(&self, channel: SensorChannel) -> Option<u8> {
        self.table.slot(channel).dma_index
    }

    /// Number of channels being acquired.
    pub fn enabled_count(&self) -> u8 {
        self.table.enabled_count()
    }
}

/// Select a converter, resolve the requested channels and bring the
/// acquisition up.
///
/// On success the converter free-runs for the rest of the process
/// lifetime; there is no teardown and no reconfiguration. On any error
/// the hardware has not been touched. An empty request is not an error:
/// the converter is left idle and every [`Sampler::sample`] returns
/// `None`.
pub fn initialize<A: RegisterAccess>(
    access: &mut A,
    instance: AdcInstance,
    request: &ChannelRequest,
    buffer: &'static mut SampleBuffer,
) -> Result<Sampler, Error> {
    let device = device::select(instance)?;
    let table = ChannelTable::build(request)?;

    if table.enabled_count() == 0 {
        debug!("adc: nothing requested, converter left idle");
        return Ok(Sampler {
            table,
            samples: buffer,
        });
    }

    init::bring_up(access, device, &table, buffer.as_mut_ptr());
    info!("adc: acquiring {} channels", table.enabled_count());

    Ok(Sampler {
        table,
        samples: buffer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::fake::{Call, FakeAccess};

    fn leaked_buffer() -> &'static mut SampleBuffer {
        Box::leak(Box::new([0; SensorChannel::COUNT]))
    }

    #[test]
    fn single_channel_acquisition() {
        let mut access = FakeAccess::new();
        let request = ChannelRequest::new().with(SensorChannel::Battery, PinTag::PA4);
        let sampler =
            initialize(&mut access, AdcInstance::Adc1, &request, leaked_buffer()).unwrap();

        assert_eq!(sampler.enabled_count(), 1);
        assert_eq!(sampler.buffer_index(SensorChannel::Battery), Some(0));
        assert!(access.calls.contains(&Call::SetupTransfer {
            len: 1,
            memory_increment: false
        }));
        assert!(access.calls.contains(&Call::SetupConverter {
            sequence_len: 1,
            scan: false
        }));
    }

    #[test]
    fn two_channel_acquisition() {
        let mut access = FakeAccess::new();
        let request = ChannelRequest::new()
            .with(SensorChannel::Battery, PinTag::PA4)
            .with(SensorChannel::Rssi, PinTag::PA1);
        let sampler =
            initialize(&mut access, AdcInstance::Adc1, &request, leaked_buffer()).unwrap();

        assert_eq!(sampler.enabled_count(), 2);
        assert_eq!(sampler.buffer_index(SensorChannel::Battery), Some(0));
        assert_eq!(sampler.buffer_index(SensorChannel::Rssi), Some(1));
        assert!(access.calls.contains(&Call::SetupTransfer {
            len: 2,
            memory_increment: true
        }));
        assert!(access.calls.contains(&Call::SetupConverter {
            sequence_len: 2,
            scan: true
        }));
        assert!(access.calls.contains(&Call::SetSequenceEntry {
            rank: 1,
            channel: 4,
            sample_time: SampleTime::Cycles239_5
        }));
        assert!(access.calls.contains(&Call::SetSequenceEntry {
            rank: 2,
            channel: 1,
            sample_time: SampleTime::Cycles239_5
        }));
    }

    #[test]
    fn samples_come_from_the_assigned_slots() {
        let mut access = FakeAccess::new();
        let request = ChannelRequest::new()
            .with(SensorChannel::Battery, PinTag::PA4)
            .with(SensorChannel::Rssi, PinTag::PA1);
        let sampler =
            initialize(&mut access, AdcInstance::Adc1, &request, leaked_buffer()).unwrap();

        // Play the DMA engine: fill the slots the transfer was armed
        // with.
        let dest = access.transfer_dest.unwrap();
        unsafe {
            dest.write_volatile(3102);
            dest.add(1).write_volatile(811);
        }

        assert_eq!(sampler.sample(SensorChannel::Battery), Some(3102));
        assert_eq!(sampler.sample(SensorChannel::Rssi), Some(811));
        assert_eq!(sampler.sample(SensorChannel::External1), None);
        assert_eq!(sampler.sample(SensorChannel::CurrentMeter), None);
    }

    #[test]
    fn empty_request_is_not_an_error_and_touches_nothing() {
        let mut access = FakeAccess::new();
        let sampler = initialize(
            &mut access,
            AdcInstance::Adc1,
            &ChannelRequest::new(),
            leaked_buffer(),
        )
        .unwrap();

        assert!(access.calls.is_empty());
        assert_eq!(sampler.enabled_count(), 0);
        for channel in SensorChannel::ALL {
            assert_eq!(sampler.sample(channel), None);
            assert!(!sampler.is_enabled(channel));
        }
    }

    #[test]
    fn unknown_device_fails_before_any_hardware_access() {
        let mut access = FakeAccess::new();
        let request = ChannelRequest::new().with(SensorChannel::Battery, PinTag::PA4);
        let err = initialize(&mut access, AdcInstance::Adc2, &request, leaked_buffer())
            .err()
            .unwrap();

        assert_eq!(err, Error::NoSuchDevice);
        assert!(access.calls.is_empty());
    }

    #[test]
    fn unresolvable_pin_fails_before_any_hardware_access() {
        let mut access = FakeAccess::new();
        let request = ChannelRequest::new().with(SensorChannel::External1, PinTag::new(Port::B, 5));
        let err = initialize(&mut access, AdcInstance::Adc1, &request, leaked_buffer())
            .err()
            .unwrap();

        assert_eq!(err, Error::UnresolvedPin(SensorChannel::External1));
        assert!(access.calls.is_empty());
    }
}
