// CLI module
// Rendering, the interactive REPL and the benchmark suite

pub mod benchmark;
pub mod display;
mod input;
mod repl;

pub use benchmark::{run_benchmark, BenchmarkCase, BenchmarkReport, BENCHMARK_CASES};
pub use input::InputHandler;
pub use repl::{Command, Repl};
