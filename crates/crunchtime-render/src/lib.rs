//! # crunchtime-render
//!
//! Rendering backends for crunchtime optimization results.
//!
//! This crate provides:
//! - Text reports for terminals
//! - MermaidJS Gantt charts (for Markdown/docs)
//!
//! JSON output needs no renderer: `OptimizationResult` is `Serialize`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use crunchtime_core::Renderer;
//! use crunchtime_render::{MermaidRenderer, TextRenderer};
//!
//! let report = TextRenderer::new().render(&workspace, &result)?;
//! let chart = MermaidRenderer::new().title("Q1 plan").render(&workspace, &result)?;
//! ```

pub mod mermaid;
pub mod text;

pub use mermaid::MermaidRenderer;
pub use text::TextRenderer;
