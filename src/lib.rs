//! RadarCore: Unlinked Reference Scanner for Note Blocks
//!
//! A Rust/WASM implementation of the keyword radar that finds page titles
//! mentioned in note blocks without being linked.
//!
//! # Architecture
//!
//! ## Radar Components
//! - `automaton.rs` - KeywordAutomaton: arena Aho-Corasick over page titles
//! - `zones.rs` - Exclusion zones (links, images, URLs, tags, `key::` prefixes)
//! - `scanner.rs` - Single-pass matcher interleaving zones and automaton steps
//! - `grouper.rs` - Clusters overlapping matches into keyword groups
//! - `linker.rs` - Rewrites blocks with `[[title]]` references
//! - `dictionary.rs` - Title filtering and rebuild watermarks
//! - `wasm.rs` - KeywordRadar: the JS-facing facade
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { KeywordRadar } from 'radarcore';
//!
//! await init();
//!
//! const radar = new KeywordRadar({ whole_word_only: false });
//! radar.rebuild(['Rust', 'Aho-Corasick', 'Note Taking']);
//!
//! const result = radar.scanBlock("learning rust and note taking");
//! console.log(result.matches); // flat keyword occurrences
//! console.log(result.groups);  // overlapping occurrences merged
//! ```
//!
//! # Usage (Rust)
//! ```
//! use radarcore::{group, KeywordAutomaton};
//!
//! let automaton = KeywordAutomaton::build(["cat", "cats"], true);
//! let text = "see [[cat]] and cats";
//! let matches = automaton.search(text, false);
//! assert_eq!(matches.len(), 2);
//! let groups = group(&matches, text);
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].text, "cats");
//! ```

pub mod radar;

pub use radar::*;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("radarcore v{}", env!("CARGO_PKG_VERSION"))
}
