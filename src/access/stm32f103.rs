use core::sync::atomic::{compiler_fence, Ordering};

use stm32f1::stm32f103 as pac;

use super::RegisterAccess;
use crate::channel::SampleTime;
use crate::device::{ClockBus, DeviceDescriptor};

/// Register backend for the STM32F103's converter/DMA pairing.
pub struct Stm32f103 {
    _private: (),
}

impl Stm32f103 {
    /// Create the backend.
    ///
    /// # Safety
    ///
    /// The caller must hold exclusive access to the selected converter,
    /// its DMA channel and the RCC enable registers for the whole
    /// bring-up, and must not create more than one backend per
    /// acquisition run.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }

    fn adc(device: &DeviceDescriptor) -> &'static pac::adc1::RegisterBlock {
        unsafe { &*(device.adc_address() as *const pac::adc1::RegisterBlock) }
    }

    fn dma_channel(device: &DeviceDescriptor) -> &'static pac::dma1::CH {
        unsafe { &*(device.dma_channel_address() as *const pac::dma1::CH) }
    }

    fn rcc() -> &'static pac::rcc::RegisterBlock {
        unsafe { &*pac::RCC::ptr() }
    }
}

impl RegisterAccess for Stm32f103 {
    fn enable_clocks(&mut self, device: &DeviceDescriptor) {
        let rcc = Self::rcc();

        // PCLK2/8 keeps the converter inside its 14MHz limit from any
        // supported bus clock (9MHz at 72MHz HSE, 8MHz at 64MHz HSI).
        rcc.cfgr.modify(|_, w| w.adcpre().div8());

        for gate in [device.converter_clock(), device.dma_clock()] {
            match gate.bus() {
                ClockBus::Apb2 => {
                    rcc.apb2enr
                        .modify(|r, w| unsafe { w.bits(r.bits() | gate.mask()) });
                }
                ClockBus::Ahb => {
                    rcc.ahbenr
                        .modify(|r, w| unsafe { w.bits(r.bits() | gate.mask()) });
                }
            }
        }
    }

    fn setup_transfer(
        &mut self,
        device: &DeviceDescriptor,
        dest: *mut u16,
        len: usize,
        memory_increment: bool,
    ) {
        let adc = Self::adc(device);
        let channel = Self::dma_channel(device);

        channel.cr.modify(|_, w| w.en().clear_bit());
        channel
            .par
            .write(|w| unsafe { w.bits(&adc.dr as *const _ as u32) });
        channel.mar.write(|w| unsafe { w.bits(dest as u32) });
        channel.ndtr.write(|w| w.ndt().bits(len as u16));
        channel.cr.modify(|_, w| {
            w.dir()
                .clear_bit()
                .circ()
                .set_bit()
                .pinc()
                .clear_bit()
                .minc()
                .bit(memory_increment)
                .psize()
                .bits16()
                .msize()
                .bits16()
                .pl()
                .high()
                .mem2mem()
                .clear_bit()
        });

        compiler_fence(Ordering::Release);
        channel.cr.modify(|_, w| w.en().set_bit());
    }

    fn setup_converter(&mut self, device: &DeviceDescriptor, sequence_len: u8, scan: bool) {
        debug_assert!(sequence_len >= 1);
        let adc = Self::adc(device);

        adc.cr1.modify(|_, w| w.scan().bit(scan).discen().clear_bit());
        adc.cr2.modify(|_, w| {
            w.cont()
                .set_bit()
                .align()
                .clear_bit()
                .exttrig()
                .clear_bit()
                // Reserve the software start bit as the trigger source.
                .extsel()
                .bits(0b111)
        });
        adc.sqr1.modify(|_, w| w.l().bits(sequence_len - 1));
    }

    fn set_sequence_entry(
        &mut self,
        device: &DeviceDescriptor,
        rank: u8,
        channel: u8,
        sample_time: SampleTime,
    ) {
        let adc = Self::adc(device);
        let smp = sample_time as u8;

        match channel {
            0 => adc.smpr2.modify(|_, w| w.smp0().bits(smp)),
            1 => adc.smpr2.modify(|_, w| w.smp1().bits(smp)),
            2 => adc.smpr2.modify(|_, w| w.smp2().bits(smp)),
            3 => adc.smpr2.modify(|_, w| w.smp3().bits(smp)),
            4 => adc.smpr2.modify(|_, w| w.smp4().bits(smp)),
            5 => adc.smpr2.modify(|_, w| w.smp5().bits(smp)),
            6 => adc.smpr2.modify(|_, w| w.smp6().bits(smp)),
            7 => adc.smpr2.modify(|_, w| w.smp7().bits(smp)),
            8 => adc.smpr2.modify(|_, w| w.smp8().bits(smp)),
            9 => adc.smpr2.modify(|_, w| w.smp9().bits(smp)),
            10 => adc.smpr1.modify(|_, w| w.smp10().bits(smp)),
            11 => adc.smpr1.modify(|_, w| w.smp11().bits(smp)),
            12 => adc.smpr1.modify(|_, w| w.smp12().bits(smp)),
            13 => adc.smpr1.modify(|_, w| w.smp13().bits(smp)),
            14 => adc.smpr1.modify(|_, w| w.smp14().bits(smp)),
            15 => adc.smpr1.modify(|_, w| w.smp15().bits(smp)),
            16 => adc.smpr1.modify(|_, w| w.smp16().bits(smp)),
            17 => adc.smpr1.modify(|_, w| w.smp17().bits(smp)),
            _ => unreachable!(),
        }

        // The regular sequence never outgrows the sensor channel count,
        // so only SQR3 ranks are reachable.
        match rank {
            1 => adc.sqr3.modify(|_, w| unsafe { w.sq1().bits(channel) }),
            2 => adc.sqr3.modify(|_, w| unsafe { w.sq2().bits(channel) }),
            3 => adc.sqr3.modify(|_, w| unsafe { w.sq3().bits(channel) }),
            4 => adc.sqr3.modify(|_, w| unsafe { w.sq4().bits(channel) }),
            5 => adc.sqr3.modify(|_, w| unsafe { w.sq5().bits(channel) }),
            6 => adc.sqr3.modify(|_, w| unsafe { w.sq6().bits(channel) }),
            _ => unreachable!(),
        }
    }

    fn enable_dma_requests(&mut self, device: &DeviceDescriptor) {
        let adc = Self::adc(device);

        adc.cr2.modify(|_, w| w.dma().set_bit());
        adc.cr2.modify(|_, w| w.adon().set_bit());
    }

    fn reset_calibration(&mut self, device: &DeviceDescriptor) {
        Self::adc(device).cr2.modify(|_, w| w.rstcal().set_bit());
    }

    fn calibration_resetting(&mut self, device: &DeviceDescriptor) -> bool {
        Self::adc(device).cr2.read().rstcal().bit_is_set()
    }

    fn start_calibration(&mut self, device: &DeviceDescriptor) {
        Self::adc(device).cr2.modify(|_, w| w.cal().set_bit());
    }

    fn calibrating(&mut self, device: &DeviceDescriptor) -> bool {
        Self::adc(device).cr2.read().cal().bit_is_set()
    }

    fn start_conversion(&mut self, device: &DeviceDescriptor) {
        Self::adc(device)
            .cr2
            .modify(|_, w| w.exttrig().set_bit().swstart().set_bit());
    }
}
