//! Unicornify Core - scene description types shared by the renderer and the
//! avatar builder.
//!
//! This crate provides:
//!
//! - **Colors**: 8-bit RGB with mixing, saturating darken/lighten and an HSL palette
//! - **Trace results**: depth hits and the interval algebra used for CSG
//! - **Scene things**: balls in a [`Skeleton`] arena, bones, flats, steaks,
//!   sandwiches, figures and the two CSG combinators
//!
//! # Example
//!
//! ```ignore
//! use unicornify_core::{Ball, Color, Figure, Skeleton, Thing};
//! use unicornify_math::Vector;
//!
//! let mut skeleton = Skeleton::new();
//! let a = skeleton.add(Ball::new(Vector::ZERO, 10.0, Color::WHITE));
//! let b = skeleton.add(Ball::new(Vector::new(50.0, 0.0, 0.0), 5.0, Color::BLACK));
//! let mut figure = Figure::new();
//! figure.add(Thing::bone(a, b));
//! ```

pub mod color;
pub mod rendering_parameters;
pub mod scene;
pub mod trace;

// Re-export commonly used types
pub use color::{Color, HueSat};
pub use rendering_parameters::RenderingParameters;
pub use scene::{
    Ball, BallId, Bone, BoneCurve, Figure, Flat, PlaneHit, Sandwich, SandwichFill, Skeleton,
    Steak, Thing,
};
pub use trace::{TraceInterval, TraceIntervals, TraceResult, NO_DIRECTION};
