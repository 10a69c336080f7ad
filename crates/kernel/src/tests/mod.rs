mod pool;
mod sync;
