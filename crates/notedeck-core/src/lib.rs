pub mod clipboard;
pub mod collab;
pub mod config;
pub mod doctor;
pub mod edit;
pub mod explorer;
pub mod library;
pub mod menu;
pub mod mode_gate;
pub mod names;
pub mod navigation;
pub mod node;
pub mod policy;
pub mod rubber_band;
pub mod selection;
pub mod time;
pub mod tree;
pub mod warning;
