// Copyright 2020 @TwoCookingMice

pub mod aabb;
pub mod constants;
pub mod distribution;
pub mod frame;
pub mod ray;
pub mod transform;
pub mod warp;
