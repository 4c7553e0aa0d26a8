//! Sensor channels and acquisition requests.
//!
//! A [`SensorChannel`] names a measurement the board routes to the
//! converter; a [`ChannelRequest`] says which of them to acquire and from
//! which pin. Requests can be assembled directly or derived from a board's
//! [`BoardPins`] declarations and a set of [`EnabledSensors`] flags.

use crate::pin::PinTag;

/// A board-level measurement source routed to the converter.
///
/// The declaration order is load-bearing: it fixes both the sample-buffer
/// slot order and the converter's scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorChannel {
    /// Battery voltage divider.
    Battery,
    /// Received-signal-strength input.
    Rssi,
    /// Auxiliary analog input.
    External1,
    /// Current-sense shunt amplifier.
    CurrentMeter,
}

impl SensorChannel {
    /// Every channel, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Battery,
        Self::Rssi,
        Self::External1,
        Self::CurrentMeter,
    ];

    /// Number of sensor channels.
    pub const COUNT: usize = Self::ALL.len();

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Sampling duration for one conversion.
///
/// Each setting is the named number of ADC clock cycles plus one half
/// cycle; the discriminant is the register encoding.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleTime {
    /// 1.5 cycles.
    Cycles1_5 = 0b000,
    /// 7.5 cycles.
    Cycles7_5 = 0b001,
    /// 13.5 cycles.
    Cycles13_5 = 0b010,
    /// 28.5 cycles.
    Cycles28_5 = 0b011,
    /// 41.5 cycles.
    Cycles41_5 = 0b100,
    /// 55.5 cycles.
    Cycles55_5 = 0b101,
    /// 71.5 cycles.
    Cycles71_5 = 0b110,
    /// 239.5 cycles. The sensors here change slowly, so every channel
    /// takes the longest setting and the relaxed source-impedance limit
    /// that comes with it.
    #[default]
    Cycles239_5 = 0b111,
}

/// Analog pin routing declared by a board definition.
///
/// A `None` entry means the board does not wire that measurement at all;
/// requests for it are suppressed no matter what the caller enables.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoardPins {
    /// Pin carrying the battery voltage divider.
    pub battery: Option<PinTag>,
    /// Pin carrying the RSSI signal.
    pub rssi: Option<PinTag>,
    /// Pin carrying the auxiliary input.
    pub external1: Option<PinTag>,
    /// Pin carrying the current-sense output.
    pub current_meter: Option<PinTag>,
}

impl BoardPins {
    /// The declared pin for `channel`, if any.
    pub fn pin(&self, channel: SensorChannel) -> Option<PinTag> {
        match channel {
            SensorChannel::Battery => self.battery,
            SensorChannel::Rssi => self.rssi,
            SensorChannel::External1 => self.external1,
            SensorChannel::CurrentMeter => self.current_meter,
        }
    }
}

/// Which measurements the caller wants acquired.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnabledSensors {
    /// Sample the battery voltage.
    pub battery: bool,
    /// Sample the RSSI input.
    pub rssi: bool,
    /// Sample the auxiliary input.
    pub external1: bool,
    /// Sample the current-sense output.
    pub current_meter: bool,
}

impl EnabledSensors {
    fn wants(&self, channel: SensorChannel) -> bool {
        match channel {
            SensorChannel::Battery => self.battery,
            SensorChannel::Rssi => self.rssi,
            SensorChannel::External1 => self.external1,
            SensorChannel::CurrentMeter => self.current_meter,
        }
    }
}

/// Map from sensor channel to the pin it should be sampled from.
///
/// A channel present with a pin is part of the scan sequence; everything
/// else is left out.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChannelRequest {
    pins: [Option<PinTag>; SensorChannel::COUNT],
}

impl ChannelRequest {
    /// A request with no channels.
    pub const fn new() -> Self {
        Self {
            pins: [None; SensorChannel::COUNT],
        }
    }

    /// Request `channel` to be sampled from `pin`.
    #[must_use]
    pub const fn with(mut self, channel: SensorChannel, pin: PinTag) -> Self {
        self.pins[channel as usize] = Some(pin);
        self
    }

    /// Derive a request from the board's pin declarations and a set of
    /// enable flags.
    ///
    /// Enabling a measurement the board declares no pin for is not an
    /// error; that request is dropped.
    pub fn from_board(board: &BoardPins, enabled: &EnabledSensors) -> Self {
        let mut request = Self::new();
        for channel in SensorChannel::ALL {
            if enabled.wants(channel) {
                if let Some(pin) = board.pin(channel) {
                    request.pins[channel.index()] = Some(pin);
                }
            }
        }
        request
    }

    /// The requested pin for `channel`, if any.
    pub fn pin(&self, channel: SensorChannel) -> Option<PinTag> {
        self.pins[channel.index()]
    }
}
