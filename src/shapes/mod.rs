// Copyright @yucwang 2026

pub mod cuboid;
pub mod triangle;
