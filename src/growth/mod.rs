//! Procedural branch structure

mod algorithm;

pub use algorithm::{BranchNode, GrowthParams, TreeGrowth};
