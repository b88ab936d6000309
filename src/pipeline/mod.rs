//! Pipeline stages for page-image-to-PDF assembly.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and confines the source site's
//! externally-owned contracts (marker element, payload schema) to single
//! files.
//!
//! ## Data Flow
//!
//! ```text
//! resolve ──▶ extract ──▶ download ──▶ pack
//! (HTML + payload) (URL list)  (decoded images) (staged PNGs → PDF)
//! ```
//!
//! 1. [`resolve`]  — follow redirects to the canonical page, fetch its HTML,
//!    and pull the embedded state out of the marker script element
//! 2. [`extract`]  — walk the payload's fixed schema path to the ordered
//!    image URL list; the only module that knows the schema
//! 3. [`download`] — sequential best-effort fetch + decode, one explicit
//!    [`download::PageOutcome`] per URL
//! 4. [`pack`]     — stage decoded images as indexed PNGs in a scratch
//!    directory, pack them into one PDF page each, in staged order

pub mod download;
pub mod extract;
pub mod pack;
pub mod resolve;
