//! Sensor acquisition subsystem.
//!
//! One analog channel feeds the whole firmware; its batching front end
//! lives in [`proximity`].

pub mod proximity;
