pub mod app;
pub mod challenge;
pub mod client;
pub mod config;
pub mod game;
pub mod game_interface;
pub mod geometry;
pub mod hud;
pub mod preferences;
pub mod solvers;
