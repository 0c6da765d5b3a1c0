pub mod config;
pub mod error;
pub mod automaton;
pub mod zones;
pub mod scanner;
pub mod grouper;
pub mod linker;
pub mod dictionary;
pub mod wasm;

mod console;


pub use config::*;
pub use error::*;
pub use automaton::*;
pub use zones::*;
pub use scanner::*;
pub use grouper::*;
pub use linker::*;
pub use dictionary::*;
pub use wasm::*;
