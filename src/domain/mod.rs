//! Domain layer: entities, value objects and the ports the application layer
//! drives. Nothing in here performs I/O.

pub mod contest;
pub mod money;
pub mod outcome;
pub mod payment;
pub mod ports;
pub mod user;
