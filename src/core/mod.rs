// Copyright @yucwang 2021

pub mod bvh;
pub mod error;
pub mod face;
pub mod geometry;
pub mod history;
pub mod material;
pub mod photon;
pub mod rng;
pub mod scene_loader;
pub mod shape;
pub mod volume;
