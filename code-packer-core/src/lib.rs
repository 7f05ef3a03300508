#![doc = "code-packer-core: core logic library for code-packer."]

//! This crate contains the walk, partition and bundle-writing logic for code-packer.
//! The CLI crate only parses arguments, loads config and prints the outcome.
//!
//! # Usage
//! Build a [`config::PackConfig`] and hand it to [`pack::pack_tree`], or to
//! [`pack::pack`] with your own [`contract::ContentReader`].

pub mod bundle;
pub mod collect;
pub mod config;
pub mod contract;
pub mod pack;
pub mod partition;
