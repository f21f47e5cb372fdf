// src/lib.rs

//! A terminal renderer pipeline.
//!
//! A [`renderer::Renderer`] reads a console's text buffer through the
//! [`data::RenderData`] trait and drives any number of
//! [`engine::RenderEngine`] backends, one frame at a time, from a dedicated
//! [`renderer::RenderThread`].

pub mod buffer;
pub mod color;
pub mod config;
pub mod data;
pub mod engine;
pub mod geometry;
pub mod glyph;
pub mod renderer;
pub mod settings;
