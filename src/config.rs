//! Slot table assembly.

use crate::channel::{ChannelRequest, SampleTime, SensorChannel};
use crate::pin::PinTag;
use crate::Error;

/// One sensor channel's acquisition state.
///
/// `enabled` is set exactly when `pin`, `channel` and `dma_index` are all
/// populated; a slot left out of the request stays zeroed.
#[derive(Debug, Default, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelSlot {
    /// Pin the sensor is wired to.
    pub pin: Option<PinTag>,
    /// Converter input the pin resolved to.
    pub channel: Option<u8>,
    /// Slot in the sample buffer; also the conversion rank minus one.
    pub dma_index: Option<u8>,
    /// Sampling duration for this channel.
    pub sample_time: SampleTime,
    /// Whether the channel takes part in the scan sequence.
    pub enabled: bool,
}

/// Dense per-channel table built from a [`ChannelRequest`].
///
/// Populated once before bring-up and read-only afterwards.
#[derive(Debug, Clone, Copy)]
pub struct ChannelTable {
    slots: [ChannelSlot; SensorChannel::COUNT],
    enabled_count: u8,
}

impl ChannelTable {
    /// Resolve a request into slot assignments.
    ///
    /// Channels are visited in [`SensorChannel`] declaration order and
    /// enabled slots receive contiguous buffer indices starting at zero,
    /// so buffer position always matches scan position. A requested pin
    /// with no analog route fails the whole build rather than silently
    /// shrinking the sequence. An empty request is a valid table with
    /// nothing enabled.
    pub fn build(request: &ChannelRequest) -> Result<Self, Error> {
        let mut slots = [ChannelSlot::default(); SensorChannel::COUNT];
        let mut enabled_count: u8 = 0;

        for sensor in SensorChannel::ALL {
            let Some(pin) = request.pin(sensor) else {
                continue;
            };
            let Some(channel) = pin.adc_channel() else {
                return Err(Error::UnresolvedPin(sensor));
            };

            slots[sensor.index()] = ChannelSlot {
                pin: Some(pin),
                channel: Some(channel),
                dma_index: Some(enabled_count),
                sample_time: SampleTime::default(),
                enabled: true,
            };
            enabled_count += 1;
        }

        Ok(Self {
            slots,
            enabled_count,
        })
    }

    /// Number of channels in the scan sequence.
    pub fn enabled_count(&self) -> u8 {
        self.enabled_count
    }

    /// Slot record for `sensor`.
    pub fn slot(&self, sensor: SensorChannel) -> &ChannelSlot {
        &self.slots[sensor.index()]
    }

    /// Enabled slots, in ascending buffer-index order.
    pub(crate) fn enabled(&self) -> impl Iterator<Item = &ChannelSlot> + '_ {
        self.slots.iter().filter(|slot| slot.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pin::Port;

    #[test]
    fn empty_request_builds_an_empty_table() {
        let table = ChannelTable::build(&ChannelRequest::new()).unwrap();

        assert_eq!(table.enabled_count(), 0);
        for sensor in SensorChannel::ALL {
            assert!(!table.slot(sensor).enabled);
            assert_eq!(table.slot(sensor).dma_index, None);
        }
    }

    #[test]
    fn indices_are_contiguous_in_declaration_order() {
        // CurrentMeter is declared last but requested first; declaration
        // order must still win.
        let request = ChannelRequest::new()
            .with(SensorChannel::CurrentMeter, PinTag::PB1)
            .with(SensorChannel::Rssi, PinTag::PA1)
            .with(SensorChannel::Battery, PinTag::PA4);
        let table = ChannelTable::build(&request).unwrap();

        assert_eq!(table.enabled_count(), 3);
        assert_eq!(table.slot(SensorChannel::Battery).dma_index, Some(0));
        assert_eq!(table.slot(SensorChannel::Rssi).dma_index, Some(1));
        assert_eq!(table.slot(SensorChannel::CurrentMeter).dma_index, Some(2));
        assert_eq!(table.slot(SensorChannel::External1).dma_index, None);
    }

    #[test]
    fn gaps_in_the_request_do_not_leave_gaps_in_the_buffer() {
        let request = ChannelRequest::new()
            .with(SensorChannel::Battery, PinTag::PA4)
            .with(SensorChannel::CurrentMeter, PinTag::PB1);
        let table = ChannelTable::build(&request).unwrap();

        assert_eq!(table.enabled_count(), 2);
        assert_eq!(table.slot(SensorChannel::Battery).dma_index, Some(0));
        assert_eq!(table.slot(SensorChannel::CurrentMeter).dma_index, Some(1));
    }

    #[test]
    fn every_enabled_slot_is_fully_populated() {
        let request = ChannelRequest::new()
            .with(SensorChannel::Battery, PinTag::PA4)
            .with(SensorChannel::Rssi, PinTag::PA1);
        let table = ChannelTable::build(&request).unwrap();

        for slot in table.enabled() {
            assert!(slot.pin.is_some());
            assert!(slot.channel.is_some());
            assert!(slot.dma_index.is_some());
        }
        assert_eq!(table.enabled().count(), 2);
    }

    #[test]
    fn resolved_channels_match_the_routing_table() {
        let request = ChannelRequest::new()
            .with(SensorChannel::Battery, PinTag::PA4)
            .with(SensorChannel::CurrentMeter, PinTag::PB1);
        let table = ChannelTable::build(&request).unwrap();

        assert_eq!(table.slot(SensorChannel::Battery).channel, Some(4));
        assert_eq!(table.slot(SensorChannel::CurrentMeter).channel, Some(9));
    }

    #[test]
    fn an_unresolvable_pin_names_the_offending_channel() {
        let request = ChannelRequest::new()
            .with(SensorChannel::Battery, PinTag::PA4)
            .with(SensorChannel::External1, PinTag::new(Port::B, 5));

        assert_eq!(
            ChannelTable::build(&request).unwrap_err(),
            Error::UnresolvedPin(SensorChannel::External1)
        );
    }
}
