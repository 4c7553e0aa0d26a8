//! Physical pin tags and the analog routing table.

/// GPIO port letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    /// Port A.
    A,
    /// Port B.
    B,
    /// Port C.
    C,
    /// Port D.
    D,
}

/// Identifies a physical pin independent of any peripheral function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinTag {
    port: Port,
    index: u8,
}

macro_rules! pin_tags {
    ($($name:ident: $port:ident $index:literal),+ $(,)?) => {
        #[allow(missing_docs)]
        impl PinTag {
            $(pub const $name: Self = Self::new(Port::$port, $index);)+
        }
    };
}

pin_tags! {
    PA0: A 0, PA1: A 1, PA2: A 2, PA3: A 3,
    PA4: A 4, PA5: A 5, PA6: A 6, PA7: A 7,
    PB0: B 0, PB1: B 1,
}

impl PinTag {
    /// Tag for pin `index` of `port`.
    pub const fn new(port: Port, index: u8) -> Self {
        Self { port, index }
    }

    /// The pin's port.
    pub const fn port(self) -> Port {
        self.port
    }

    /// The pin's index within its port.
    pub const fn index(self) -> u8 {
        self.index
    }

    /// Converter input this pin is wired to, or `None` when the pin has
    /// no analog function.
    pub fn adc_channel(self) -> Option<u8> {
        ANALOG_PINS
            .iter()
            .find(|(tag, _)| *tag == self)
            .map(|&(_, channel)| channel)
    }
}

/// ADC12 input routing (RM0008): PA0..PA7 are inputs 0..7, PB0/PB1 are
/// inputs 8/9. Nothing else on these packages reaches the converter.
const ANALOG_PINS: [(PinTag, u8); 10] = [
    (PinTag::PA0, 0),
    (PinTag::PA1, 1),
    (PinTag::PA2, 2),
    (PinTag::PA3, 3),
    (PinTag::PA4, 4),
    (PinTag::PA5, 5),
    (PinTag::PA6, 6),
    (PinTag::PA7, 7),
    (PinTag::PB0, 8),
    (PinTag::PB1, 9),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analog_pins_resolve() {
        assert_eq!(PinTag::PA0.adc_channel(), Some(0));
        assert_eq!(PinTag::PA4.adc_channel(), Some(4));
        assert_eq!(PinTag::PB0.adc_channel(), Some(8));
        assert_eq!(PinTag::PB1.adc_channel(), Some(9));
    }

    #[test]
    fn digital_only_pins_do_not() {
        assert_eq!(PinTag::new(Port::A, 9).adc_channel(), None);
        assert_eq!(PinTag::new(Port::B, 3).adc_channel(), None);
        assert_eq!(PinTag::new(Port::C, 0).adc_channel(), None);
    }
}
