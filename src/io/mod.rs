// Copyright @yucwang 2026

pub mod history_writer;
pub mod obj_utils;
