#![allow(dead_code)]

pub mod cluster;
pub mod project;
pub mod report;
