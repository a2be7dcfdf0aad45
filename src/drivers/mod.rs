//! Actuator drivers, hardware initialisation, and peripheral helpers.

pub mod hw_init;
pub mod hw_timer;
pub mod rgb_led;
pub mod serial_link;
pub mod watchdog;
