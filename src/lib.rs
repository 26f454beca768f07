//! nebbia - Find OpenStreetMap restaurants above the fog line

pub mod api;
pub mod config;
pub mod domain;
pub mod osm;
pub mod output;
pub mod pipeline;
