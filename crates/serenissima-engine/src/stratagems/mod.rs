//! Stratagem lifecycles.
//!
//! A stratagem is a longer-lived declared plan that accepts participant
//! activities while `active` and aggregates their outcomes. Aggregate
//! state lives in normalized participant rows -- one row per
//! (stratagem, citizen) -- so two deliveries landing at once touch
//! different rows instead of racing over one embedded blob.

pub mod collective_delivery;
