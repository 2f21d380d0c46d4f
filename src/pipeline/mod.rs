//! Pipeline stages for magazine generation.
//!
//! Each submodule implements one transformation step; rendering lives in
//! [`crate::render`].
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ prompt ──▶ llm ──▶ postprocess ──▶ sections ──▶ render
//! (files)     (text)     (reply)  (cleanup)      (map)        (pdf/html)
//! ```
//!
//! 1. [`extract`] — dispatch each input on its extension and concatenate the
//!    text; blocking format libraries run in `spawn_blocking`
//! 2. [`crate::prompts`] — detect content types and compose the instruction
//! 3. [`llm`] — ordered backend chain (hosted, then local); the only stage
//!    with network I/O
//! 4. [`postprocess`] — deterministic clean-up of the model's reply
//! 5. [`sections`] — parse the reply into an ordered section map

pub mod extract;
pub mod llm;
pub mod postprocess;
pub mod sections;
