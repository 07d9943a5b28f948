// Checksum primitives for delta synchronization.
//
// Two families:
//   - `rolling` — weak 32-bit rolling checksum, cheap and collision-prone,
//     used to filter candidate blocks while sliding over the target.
//   - `strong` — collision-resistant digests used to confirm a weak hit.

pub mod rolling;
pub mod strong;

pub use rolling::Rolling32;
pub use strong::StrongAlgorithm;
