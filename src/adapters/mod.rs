//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements | Connects to              |
//! |------------|------------|--------------------------|
//! | `hardware` | LightPort  | ESP32 LEDC PWM channels  |
//! |            | LinkPort   | ESP32 UART link          |
//! | `log_sink` | EventSink  | Serial log output        |

pub mod hardware;
pub mod log_sink;
