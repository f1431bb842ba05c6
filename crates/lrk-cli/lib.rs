/// The lookahead bound compiled into both CLI binaries. Mirrors the original
/// C++ project's `#define K 1` default: changing the value and rebuilding is
/// how a deployment picks a different `k`, since `Tables<K>`/`Runtime<K>` are
/// monomorphized per `K` at compile time.
pub const LOOKAHEAD: usize = 1;
