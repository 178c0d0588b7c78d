//! Rules engine and vote scheduler for Go games played by many people at
//! once, either by rostered players moving directly or by an open pool of
//! participants voting on each move.

pub mod core;
pub mod gogame;
