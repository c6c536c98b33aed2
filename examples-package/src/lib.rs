//! Runnable demos of the shard store live under `examples/`.
