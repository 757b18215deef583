//! # Core Module
//!
//! Concurrency primitives shared by the simulation thread and the streaming worker.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource with read-write locking
//! - `PoisonedResource`: Error raised when a lock holder panicked
//!
//! ## Usage
//! ```rust
//! use voxel_world::core::MtResource;
//!
//! let counter = MtResource::new(0);
//! *counter.get_mut().unwrap() += 1;
//! assert_eq!(*counter.get().unwrap(), 1);
//! ```

pub mod mt_resource;

pub use mt_resource::{MtResource, PoisonedResource};
