// drawxy: multisampled shape rendering as a cpu throughput benchmark.
// scalar vs 8-lane simd, one thread vs many.

pub mod grid; // per-pixel result storage and ascii preview
pub mod params; // run parameters and coordinate window
pub mod report; // console text and json summaries
pub mod result; // run results and score formulas
pub mod runner; // benchmark drivers and loop orchestration
pub mod sampling; // sub-sample averaging, the hot loop
pub mod scheduler; // thread pool and claim-next-index work distribution
pub mod shape; // shape predicates, scalar and vectorized
pub mod sync; // start gate and completion latch
