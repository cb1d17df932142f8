// Copyright @yucwang 2026

pub mod intersector;
pub mod resolver;
pub mod tracker;
