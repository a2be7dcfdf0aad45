//! One-shot hardware peripheral initialization.
//!
//! Configures the ADC channel, LEDC timer/channels, and the UART driver
//! using raw ESP-IDF sys calls. Called once from `main()` before the
//! timers start.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    LedcInitFailed(i32),
    UartInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::LedcInitFailed(rc) => write!(f, "LEDC timer/channel config failed (rc={})", rc),
            Self::UartInitFailed(rc) => write!(f, "UART driver install failed (rc={})", rc),
        }
    }
}

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the timers start; single-threaded.
    unsafe {
        init_adc()?;
        init_ledc()?;
        init_uart()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

/// ADC1 channel wired to the proximity divider (GPIO5 on the S3).
pub const ADC1_CH_PROXIMITY: u32 = 4;

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only after `init_adc()` completed. ADC1_HANDLE
/// is written exactly once at boot, before the sampling timer starts;
/// every later access is a read.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }

    // 0 dB attenuation: the divider tops out well under a volt.
    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_0,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), ADC1_CH_PROXIMITY, &chan_cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }

    info!("hw_init: ADC1 configured (CH{}=proximity)", ADC1_CH_PROXIMITY);
    Ok(())
}

/// Read the proximity channel, on the 10-bit scale the engine works in.
///
/// `None` when the converter reports an error; the caller skips the
/// sample rather than feed a fabricated reading into the window.
#[cfg(target_os = "espidf")]
pub fn adc1_read_proximity() -> Option<u16> {
    let mut raw: i32 = 0;
    // SAFETY: ADC1_HANDLE was written once during init_adc() before the
    // sampling timer started; this runs in the timer dispatch task and
    // only reads it.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), ADC1_CH_PROXIMITY, &mut raw) };
    if ret != ESP_OK as i32 {
        log::debug!("adc_oneshot_read rc={}", ret);
        return None;
    }
    // The unit samples at 12 bits; fold down to the 10-bit range.
    Some((raw.max(0) as u16) >> 2)
}

// ── LEDC PWM ─────────────────────────────────────────────────

pub const LEDC_CH_LED_R: u32 = 0;
pub const LEDC_CH_LED_G: u32 = 1;
pub const LEDC_CH_LED_B: u32 = 2;

#[cfg(target_os = "espidf")]
unsafe fn init_ledc() -> Result<(), HwInitError> {
    // Timer 0: feedback light (1 kHz, 8-bit)
    // SAFETY: Called from single main-task context via init_peripherals().
    let timer0 = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_8_BIT,
        freq_hz: pins::LED_PWM_FREQ_HZ,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    let ret = unsafe { ledc_timer_config(&timer0) };
    if ret != ESP_OK as i32 { return Err(HwInitError::LedcInitFailed(ret)); }

    // Channels 0-2: R, G, B
    let led_gpios = [pins::LED_R_GPIO, pins::LED_G_GPIO, pins::LED_B_GPIO];
    for (i, &gpio) in led_gpios.iter().enumerate() {
        let ret = unsafe {
            ledc_channel_config(&ledc_channel_config_t {
                speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
                channel: LEDC_CH_LED_R + i as u32,
                timer_sel: ledc_timer_t_LEDC_TIMER_0,
                gpio_num: gpio,
                duty: 0,
                hpoint: 0,
                ..Default::default()
            })
        };
        if ret != ESP_OK as i32 { return Err(HwInitError::LedcInitFailed(ret)); }
    }

    info!("hw_init: LEDC configured (led=CH0-2)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn ledc_set(channel: u32, duty: u8) {
    // SAFETY: LEDC channels were configured in init_ledc(); duty register
    // writes are race-free since only the main loop calls this function.
    unsafe {
        esp_idf_svc::sys::ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel, duty as u32);
        esp_idf_svc::sys::ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_set(_channel: u32, _duty: u8) {}

// ── UART link ─────────────────────────────────────────────────

/// Driver-level ring buffers. TX buffering keeps frame writes
/// non-blocking; the ready poll below reports when the FIFO drains.
#[cfg(target_os = "espidf")]
const UART_RX_BUF_BYTES: i32 = 256;
#[cfg(target_os = "espidf")]
const UART_TX_BUF_BYTES: i32 = 256;

#[cfg(target_os = "espidf")]
unsafe fn init_uart() -> Result<(), HwInitError> {
    let cfg = uart_config_t {
        baud_rate: pins::LINK_BAUD_RATE as i32,
        data_bits: uart_word_length_t_UART_DATA_8_BITS,
        parity: uart_parity_t_UART_PARITY_DISABLE,
        stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
        flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
        ..Default::default()
    };
    let ret = unsafe { uart_param_config(pins::LINK_UART_PORT, &cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::UartInitFailed(ret)); }

    let ret = unsafe {
        uart_set_pin(pins::LINK_UART_PORT, pins::LINK_TX_GPIO, pins::LINK_RX_GPIO, -1, -1)
    };
    if ret != ESP_OK as i32 { return Err(HwInitError::UartInitFailed(ret)); }

    let ret = unsafe {
        uart_driver_install(
            pins::LINK_UART_PORT,
            UART_RX_BUF_BYTES,
            UART_TX_BUF_BYTES,
            0,
            core::ptr::null_mut(),
            0,
        )
    };
    if ret != ESP_OK as i32 { return Err(HwInitError::UartInitFailed(ret)); }

    info!(
        "hw_init: UART{} configured at {} baud",
        pins::LINK_UART_PORT,
        pins::LINK_BAUD_RATE
    );
    Ok(())
}

/// TX FIFO idle probe. Zero timeout makes this a poll, not a wait.
#[cfg(target_os = "espidf")]
pub fn uart_tx_idle() -> bool {
    // SAFETY: the driver was installed in init_uart(); a zero-tick wait
    // only samples the TX-done state.
    (unsafe { uart_wait_tx_done(pins::LINK_UART_PORT, 0) }) == ESP_OK as i32
}

/// Queue bytes on the TX ring. Returns the driver's count of bytes
/// accepted, or a negative driver code.
#[cfg(target_os = "espidf")]
pub fn uart_write(bytes: &[u8]) -> i32 {
    // SAFETY: uart_write_bytes copies out of `bytes` before returning,
    // so the slice only needs to live for the call.
    unsafe {
        uart_write_bytes(
            pins::LINK_UART_PORT,
            bytes.as_ptr().cast::<core::ffi::c_void>(),
            bytes.len(),
        )
    }
}

/// Non-blocking single-byte read. `None` when the RX FIFO is empty.
#[cfg(target_os = "espidf")]
pub fn uart_read_byte() -> Option<u8> {
    let mut byte: u8 = 0;
    // SAFETY: the driver was installed in init_uart(); zero timeout makes
    // this a poll and the out pointer outlives the call.
    let n = unsafe { uart_read_bytes(pins::LINK_UART_PORT, (&raw mut byte).cast(), 1, 0) };
    (n == 1).then_some(byte)
}
