// Copyright @yucwang 2021

pub mod core;
pub mod io;
pub mod math;
pub mod optics;
pub mod runners;
pub mod shapes;
pub mod sources;
pub mod surfaces;
pub mod tracking;
