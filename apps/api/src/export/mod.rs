// Export surfaces for a completed report: percent-encoded share text with
// channel URIs, and the structured document handed to the external renderer.

pub mod document;
pub mod handlers;
pub mod share;
