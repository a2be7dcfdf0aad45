//! GPIO / peripheral pin assignments for the ProxiSense board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Proximity sensor — Analog (ADC1)
// ---------------------------------------------------------------------------

/// Analog proximity/voltage sensor input.
/// ADC1 channel 4 (GPIO 5 on ESP32-S3).
pub const PROXIMITY_ADC_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Feedback LED (discrete RGB, common cathode)
// ---------------------------------------------------------------------------

pub const LED_R_GPIO: i32 = 11;
pub const LED_G_GPIO: i32 = 12;
pub const LED_B_GPIO: i32 = 13;

/// LEDC carrier for the RGB feedback LED.  8-bit duty resolution gives
/// 0 – 255 levels, matching the intensity triple range one-to-one.
pub const LED_PWM_FREQ_HZ: u32 = 1_000;

// ---------------------------------------------------------------------------
// UART link to the external controller
// ---------------------------------------------------------------------------

/// UART port carrying feedback frames (the console stays on UART0).
pub const LINK_UART_PORT: i32 = 1;
pub const LINK_TX_GPIO: i32 = 17;
pub const LINK_RX_GPIO: i32 = 18;
/// Link baud rate, 8N1.
pub const LINK_BAUD_RATE: u32 = 115_200;
