// Copyright @yucwang 2023

pub mod cube;
pub mod triangle;
