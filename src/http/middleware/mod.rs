//! Request gates applied before the relay handler.

pub mod assertion;
