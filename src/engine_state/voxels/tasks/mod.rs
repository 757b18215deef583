//! # Voxel Task System
//!
//! This module contains the work the streaming worker performs for each chunk request.
//! Terrain generation runs without holding the world lock; only the registration of
//! the generated blocks and the exposure queries happen under the write lock.

pub mod chunk_change_task;
