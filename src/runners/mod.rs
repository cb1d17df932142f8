// Copyright @yucwang 2026

pub mod parallel;
pub mod runner;
