mod bitset;
mod executor;
